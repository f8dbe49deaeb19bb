//! Pure match computation.
//!
//! Nothing here touches a registry or a ledger: given two orders and the
//! already-resolved token details, the same inputs always give the same
//! [`MatchResult`]. Resolution and ordering of the checks live in
//! [`crate::engine`].
//!
//! ## Arithmetic
//!
//! ```text
//! clearing      = (buy.price + sell.price) / 2        exact at 13 places
//! volume        = min(buy.volume, sell.volume)        12 places
//! non_priority  = volume → token decimals             truncating
//! priority      = volume × clearing → token decimals  25 places, 256-bit, truncating
//! ```

use std::cmp::Ordering;

use clearswap_types::constants::CLEARING_PRICE_DECIMALS;
use clearswap_types::{
    ClearswapError, Fee, FeeSchedule, Fixed, MatchResult, Order, OrderParity, Price, Result,
    SettlementInstructions, SettlementMode, TokenCode, TokenDetails, TokenPair, TraderId,
    Transfer, Volume,
};

/// Structural compatibility of a buy/sell pair, checked in this order:
/// identical token pair, correct parities, distinct traders, crossing
/// prices, identical settlement ids.
pub fn check_compatibility(buy: &Order, sell: &Order) -> Result<()> {
    if buy.tokens != sell.tokens {
        return Err(ClearswapError::incompatible(format!(
            "token pairs differ: {} vs {}",
            buy.tokens, sell.tokens
        )));
    }
    if buy.parity != OrderParity::Buy || sell.parity != OrderParity::Sell {
        return Err(ClearswapError::incompatible(format!(
            "expected BUY/SELL, got {}/{}",
            buy.parity, sell.parity
        )));
    }
    if buy.trader == sell.trader {
        return Err(ClearswapError::SelfTrade(buy.trader));
    }
    if buy.price < sell.price {
        return Err(ClearswapError::incompatible(format!(
            "buy price {} below sell price {}",
            buy.price, sell.price
        )));
    }
    if buy.settlement_id != sell.settlement_id {
        return Err(ClearswapError::incompatible(format!(
            "settlement ids differ: {} vs {}",
            buy.settlement_id, sell.settlement_id
        )));
    }
    Ok(())
}

/// Atomic settlement needs exactly one leg on the native ledger.
pub fn ensure_atomic_pair(tokens: TokenPair, native_token: TokenCode) -> Result<()> {
    if (tokens.priority == native_token) == (tokens.non_priority == native_token) {
        return Err(ClearswapError::UnsupportedAtomicPair {
            priority: tokens.priority,
            non_priority: tokens.non_priority,
        });
    }
    Ok(())
}

/// Exact midpoint of two prices at [`CLEARING_PRICE_DECIMALS`] places.
///
/// `(a + b) / 2` at 12 places equals `5 × (a + b)` at 13.
pub fn clearing_price(buy: Price, sell: Price) -> Result<Fixed> {
    buy.raw()
        .checked_add(sell.raw())
        .and_then(|sum| sum.checked_mul(5))
        .map(|mantissa| Fixed::new(mantissa, CLEARING_PRICE_DECIMALS))
        .ok_or_else(|| ClearswapError::ArithmeticOverflow(format!("midpoint of {buy} and {sell}")))
}

/// `min(buy.volume, sell.volume)`, provided it satisfies both minimums.
pub fn matched_volume(buy: &Order, sell: &Order) -> Result<Volume> {
    let volume = buy.volume.min(sell.volume);
    for order in [buy, sell] {
        if volume < order.minimum_volume {
            return Err(ClearswapError::incompatible(format!(
                "matched volume {volume} below minimum {} of order {}",
                order.minimum_volume, order.id
            )));
        }
    }
    Ok(volume)
}

/// Everything the computation needs beyond the orders themselves.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub mode: SettlementMode,
    pub priority: &'a TokenDetails,
    pub non_priority: &'a TokenDetails,
    pub native_token: TokenCode,
    pub fees: &'a FeeSchedule,
}

/// Compute the match of two compatible orders.
pub fn compute_match(buy: &Order, sell: &Order, ctx: &MatchContext<'_>) -> Result<MatchResult> {
    let clearing = clearing_price(buy.price, sell.price)?;
    let volume = matched_volume(buy, sell)?;

    let non_priority_volume = volume
        .to_fixed()
        .rescale(u32::from(ctx.non_priority.decimals))?;
    let priority_volume = volume
        .to_fixed()
        .mul_truncate(&clearing, u32::from(ctx.priority.decimals))?;

    let (buyer_fee, seller_fee) = match ctx.mode {
        SettlementMode::Standard => (
            fee_on(ctx.fees, ctx.non_priority.code, non_priority_volume)?,
            fee_on(ctx.fees, ctx.priority.code, priority_volume)?,
        ),
        SettlementMode::AtomicCrossChain => {
            let native_leg = if ctx.priority.code == ctx.native_token {
                priority_volume
            } else {
                non_priority_volume
            };
            let fee = fee_on(ctx.fees, ctx.native_token, native_leg)?;
            (fee, fee)
        }
    };

    tracing::debug!(
        buy = %buy.id,
        sell = %sell.id,
        clearing = %clearing,
        volume = %volume,
        priority = %priority_volume,
        non_priority = %non_priority_volume,
        "Match computed"
    );

    debug_assert!(clearing.value_cmp(&sell.price.to_fixed()) != Ordering::Less);
    debug_assert!(clearing.value_cmp(&buy.price.to_fixed()) != Ordering::Greater);

    Ok(MatchResult {
        mode: ctx.mode,
        clearing_price: clearing,
        volume,
        priority_volume,
        non_priority_volume,
        buyer_fee,
        seller_fee,
    })
}

fn fee_on(fees: &FeeSchedule, token: TokenCode, amount: Fixed) -> Result<Fee> {
    Ok(Fee {
        token,
        amount: Fixed::new(fees.fee_on(amount.mantissa())?, amount.decimals()),
    })
}

/// Ledger transfers for a computed match.
///
/// Standard: the buyer pays the priority leg and the seller the
/// non-priority leg; each side's fee is withheld from what it receives and
/// routed to `fee_recipient`. Atomic: value legs cross through the escrow,
/// so only the two native-token fees move here.
pub fn build_instructions(
    buy: &Order,
    sell: &Order,
    result: MatchResult,
    fee_recipient: TraderId,
) -> Result<SettlementInstructions> {
    let (buyer, seller) = (buy.trader, sell.trader);
    let tokens = buy.tokens;
    let mut transfers = Vec::with_capacity(4);

    match result.mode {
        SettlementMode::Standard => {
            let priority = result.priority_volume.mantissa();
            let non_priority = result.non_priority_volume.mantissa();
            let seller_fee = result.seller_fee.amount.mantissa();
            let buyer_fee = result.buyer_fee.amount.mantissa();
            let net = |gross: u128, fee: u128| {
                gross.checked_sub(fee).ok_or_else(|| {
                    ClearswapError::ArithmeticOverflow(format!("fee {fee} exceeds amount {gross}"))
                })
            };

            transfers.push(Transfer::new(tokens.priority, buyer, seller, net(priority, seller_fee)?));
            transfers.push(Transfer::new(tokens.priority, buyer, fee_recipient, seller_fee));
            transfers.push(Transfer::new(
                tokens.non_priority,
                seller,
                buyer,
                net(non_priority, buyer_fee)?,
            ));
            transfers.push(Transfer::new(tokens.non_priority, seller, fee_recipient, buyer_fee));
        }
        SettlementMode::AtomicCrossChain => {
            transfers.push(Transfer::new(
                result.buyer_fee.token,
                buyer,
                fee_recipient,
                result.buyer_fee.amount.mantissa(),
            ));
            transfers.push(Transfer::new(
                result.seller_fee.token,
                seller,
                fee_recipient,
                result.seller_fee.amount.mantissa(),
            ));
        }
    }
    transfers.retain(|transfer| transfer.amount > 0);

    Ok(SettlementInstructions {
        buy_order: buy.id,
        sell_order: sell.id,
        buyer,
        seller,
        result,
        transfers,
    })
}
