//! The settlement engine.
//!
//! ## Flow
//!
//! ```text
//!   submit_order ──▶ validate ─▶ order book CONFIRMED? ─▶ broker authorized?
//!                    ─▶ countersignature valid? ─▶ stored (immutable)
//!
//!   settle(buy, sell) ──▶ both stored? ─▶ matched to each other? ─▶ unsettled?
//!                    ─▶ match_orders ─▶ build transfers ─▶ ledger.apply (atomic)
//!                    ─▶ mark settled
//! ```
//!
//! `match_orders` is a pure query and can be called on any two orders,
//! submitted or not.

use std::collections::HashMap;

use clearswap_types::{
    ClearswapError, EngineConfig, MatchResult, Order, OrderId, OrderState, Result,
    SettlementInstructions, SettlementMode, TokenCode, TokenDetails,
};

use crate::idempotency::IdempotencyGuard;
use crate::matching::{self, MatchContext};
use crate::ports::{BalancesLedger, OrderBook, TokenRegistry};
use crate::registry::SettlementRegistry;

/// Matches and settles confirmed order pairs.
pub struct SettlementEngine<R, B> {
    config: EngineConfig,
    tokens: R,
    settlements: SettlementRegistry,
    order_book: B,
    orders: HashMap<OrderId, Order>,
    idempotency: IdempotencyGuard,
}

impl<R: TokenRegistry, B: OrderBook> SettlementEngine<R, B> {
    /// Create an engine over the given registries and order book.
    ///
    /// # Errors
    /// Returns [`ClearswapError::Configuration`] if `config` is invalid.
    pub fn new(
        config: EngineConfig,
        tokens: R,
        settlements: SettlementRegistry,
        order_book: B,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tokens,
            settlements,
            order_book,
            orders: HashMap::new(),
            idempotency: IdempotencyGuard::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn order_book(&self) -> &B {
        &self.order_book
    }

    pub fn order_book_mut(&mut self) -> &mut B {
        &mut self.order_book
    }

    pub fn token_registry_mut(&mut self) -> &mut R {
        &mut self.tokens
    }

    pub fn settlements_mut(&mut self) -> &mut SettlementRegistry {
        &mut self.settlements
    }

    /// A submitted order.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    #[must_use]
    pub fn is_settled(&self, id: OrderId) -> bool {
        self.idempotency.is_settled(&id)
    }

    // -----------------------------------------------------------------
    // Matching
    // -----------------------------------------------------------------

    /// Compute the match of `buy` against `sell`.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// token pair, parities, self-trade, prices, settlement id (equal,
    /// registered, executable), atomic pair, token resolution, token
    /// precision, volume minimums.
    pub fn match_orders(&self, buy: &Order, sell: &Order) -> Result<MatchResult> {
        let result = self.try_match(buy, sell);
        if let Err(err) = &result {
            tracing::warn!(
                buy = %buy.id,
                sell = %sell.id,
                class = %err.class(),
                error = %err,
                "Match rejected"
            );
        }
        result
    }

    fn try_match(&self, buy: &Order, sell: &Order) -> Result<MatchResult> {
        matching::check_compatibility(buy, sell)?;

        let settlement_id = buy.settlement_id;
        if !self.settlements.is_registered(settlement_id) {
            return Err(ClearswapError::InvalidSettlementMode(settlement_id));
        }
        let mode = SettlementMode::try_from(settlement_id)?;
        if mode == SettlementMode::AtomicCrossChain {
            matching::ensure_atomic_pair(buy.tokens, self.config.native_token)?;
        }

        let priority = self.resolve_token(buy.tokens.priority)?;
        let non_priority = self.resolve_token(buy.tokens.non_priority)?;

        let ctx = MatchContext {
            mode,
            priority: &priority,
            non_priority: &non_priority,
            native_token: self.config.native_token,
            fees: &self.config.fees,
        };
        matching::compute_match(buy, sell, &ctx)
    }

    fn resolve_token(&self, code: TokenCode) -> Result<TokenDetails> {
        let details = self
            .tokens
            .token_details(code)
            .ok_or(ClearswapError::TokenNotRegistered(code))?;
        details.ensure_supported_precision()?;
        Ok(details)
    }

    // -----------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------

    /// Accept an order for settlement.
    ///
    /// The order must be structurally valid, confirmed in the order book
    /// under the same trader, and countersigned by a broker authorized for
    /// its settlement id.
    pub fn submit_order(&mut self, order: Order) -> Result<()> {
        order.validate()?;
        if self.orders.contains_key(&order.id) {
            return Err(ClearswapError::DuplicateOrder(order.id));
        }
        if self.order_book.order_state(order.id) != OrderState::Confirmed {
            return Err(ClearswapError::OrderNotConfirmed(order.id));
        }
        if self.order_book.order_trader(order.id) != Some(order.trader) {
            return Err(ClearswapError::UnauthorizedTrader(order.id));
        }
        let verifier = self.settlements.verifier(order.settlement_id)?;
        if !verifier.is_authorized(&order.broker) {
            tracing::warn!(order = %order.id, broker = %order.broker, "Order from unauthorized broker");
            return Err(ClearswapError::UnauthorizedBroker(order.broker));
        }
        order.verify_broker_signature()?;

        tracing::debug!(
            order = %order.id,
            parity = %order.parity,
            tokens = %order.tokens,
            price = %order.price,
            volume = %order.volume,
            "Order submitted"
        );
        self.orders.insert(order.id, order);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------

    /// Settle two submitted orders the order book matched together.
    ///
    /// Transfers are applied atomically to `ledger`; on any failure nothing
    /// moves and neither order is marked settled.
    pub fn settle<L: BalancesLedger>(
        &mut self,
        buy_id: OrderId,
        sell_id: OrderId,
        ledger: &mut L,
    ) -> Result<SettlementInstructions> {
        let buy = self
            .orders
            .get(&buy_id)
            .ok_or(ClearswapError::OrderNotFound(buy_id))?;
        let sell = self
            .orders
            .get(&sell_id)
            .ok_or(ClearswapError::OrderNotFound(sell_id))?;

        if self.order_book.order_match(buy_id) != Some(sell_id)
            || self.order_book.order_match(sell_id) != Some(buy_id)
        {
            return Err(ClearswapError::OrdersNotMatched {
                buy: buy_id,
                sell: sell_id,
            });
        }
        self.idempotency.ensure_unsettled(buy_id)?;
        self.idempotency.ensure_unsettled(sell_id)?;

        let result = self.match_orders(buy, sell)?;
        let instructions =
            matching::build_instructions(buy, sell, result, self.config.fee_recipient)?;
        ledger.apply(&instructions.transfers)?;

        self.idempotency.mark_settled(buy_id)?;
        self.idempotency.mark_settled(sell_id)?;

        tracing::info!(
            buy = %buy_id,
            sell = %sell_id,
            mode = %instructions.result.mode,
            clearing_price = %instructions.result.clearing_price,
            priority = %instructions.result.priority_volume,
            non_priority = %instructions.result.non_priority_volume,
            transfers = instructions.transfers.len(),
            "Orders settled"
        );
        Ok(instructions)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clearswap_types::{OrderParity, SettlementId, TokenListing, TokenPair, TraderId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::orderbook::InMemoryOrderBook;
    use crate::registry::{InMemoryTokenRegistry, RegisteredBrokers};

    const DGX_REN: TokenPair = TokenPair::new(TokenCode::DGX, TokenCode::REN);

    fn engine() -> SettlementEngine<InMemoryTokenRegistry, InMemoryOrderBook> {
        let brokers = Arc::new(RegisteredBrokers::new());
        brokers.register(clearswap_types::BrokerId(
            Order::test_broker_key().verifying_key().to_bytes(),
        ));
        let mut settlements = SettlementRegistry::new();
        settlements.register(SettlementMode::Standard.id(), brokers);
        SettlementEngine::new(
            EngineConfig::new(TraderId::new()),
            InMemoryTokenRegistry::from_listings(&TokenListing::standard()).unwrap(),
            settlements,
            InMemoryOrderBook::new(),
        )
        .unwrap()
    }

    fn confirmed_pair(
        engine: &mut SettlementEngine<InMemoryTokenRegistry, InMemoryOrderBook>,
    ) -> (Order, Order) {
        let buy = Order::dummy(OrderParity::Buy, DGX_REN, Decimal::ONE, Decimal::ONE);
        let sell = Order::dummy(OrderParity::Sell, DGX_REN, Decimal::ONE, Decimal::ONE);
        let book = engine.order_book_mut();
        book.open(buy.id, buy.trader).unwrap();
        book.open(sell.id, sell.trader).unwrap();
        book.confirm(buy.id, sell.id).unwrap();
        (buy, sell)
    }

    #[test]
    fn submit_requires_confirmation() {
        let mut engine = engine();
        let order = Order::dummy(OrderParity::Buy, DGX_REN, Decimal::ONE, Decimal::ONE);
        engine.order_book_mut().open(order.id, order.trader).unwrap();
        let err = engine.submit_order(order).unwrap_err();
        assert!(matches!(err, ClearswapError::OrderNotConfirmed(_)));
    }

    #[test]
    fn submit_rejects_duplicates() {
        let mut engine = engine();
        let (buy, _) = confirmed_pair(&mut engine);
        engine.submit_order(buy.clone()).unwrap();
        let err = engine.submit_order(buy).unwrap_err();
        assert!(matches!(err, ClearswapError::DuplicateOrder(_)));
    }

    #[test]
    fn submit_rejects_foreign_trader() {
        let mut engine = engine();
        let (mut buy, _) = confirmed_pair(&mut engine);
        buy.trader = TraderId::new();
        let err = engine.submit_order(buy.resigned()).unwrap_err();
        assert!(matches!(err, ClearswapError::UnauthorizedTrader(_)));
    }

    #[test]
    fn submit_rejects_unregistered_settlement() {
        let mut engine = engine();
        let (buy, _) = confirmed_pair(&mut engine);
        let buy = buy.with_settlement(SettlementId(2)).resigned();
        let err = engine.submit_order(buy).unwrap_err();
        assert!(matches!(err, ClearswapError::InvalidSettlementMode(SettlementId(2))));
    }

    #[test]
    fn submit_rejects_unauthorized_broker() {
        let mut engine = engine();
        let (buy, _) = confirmed_pair(&mut engine);
        let rogue = ed25519_dalek::SigningKey::from_bytes(&[9u8; 32]);
        let err = engine.submit_order(buy.signed_by(&rogue)).unwrap_err();
        assert!(matches!(err, ClearswapError::UnauthorizedBroker(_)));
    }

    #[test]
    fn submit_rejects_bad_signature() {
        let mut engine = engine();
        let (mut buy, _) = confirmed_pair(&mut engine);
        buy.nonce += 1;
        let err = engine.submit_order(buy).unwrap_err();
        assert!(matches!(err, ClearswapError::InvalidBrokerSignature(_)));
    }

    #[test]
    fn settle_unknown_order() {
        let mut engine = engine();
        let mut ledger = crate::balances::InMemoryBalances::new();
        let err = engine
            .settle(OrderId::new(), OrderId::new(), &mut ledger)
            .unwrap_err();
        assert!(matches!(err, ClearswapError::OrderNotFound(_)));
    }
}
