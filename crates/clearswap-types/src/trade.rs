//! Match results and the ledger instructions derived from them.
//!
//! A [`MatchResult`] is the pure outcome of matching a buy and a sell order.
//! [`SettlementInstructions`] adds the concrete [`Transfer`]s the balances
//! ledger must apply, all-or-nothing.

use serde::{Deserialize, Serialize};

use crate::{Fixed, OrderId, SettlementMode, TokenCode, TraderId, Volume};

/// A fee owed by one side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub token: TokenCode,
    /// Amount in the token's native unit.
    pub amount: Fixed,
}

/// Outcome of matching a buy order against a sell order.
///
/// Never persisted on its own; recomputing from the same orders always
/// yields the same result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub mode: SettlementMode,
    /// Exact midpoint of the two order prices.
    pub clearing_price: Fixed,
    /// Matched volume at order precision: `min(buy.volume, sell.volume)`.
    pub volume: Volume,
    /// Priority-token amount paid by the buyer, in the token's native unit.
    pub priority_volume: Fixed,
    /// Non-priority-token amount paid by the seller, in the token's native unit.
    pub non_priority_volume: Fixed,
    pub buyer_fee: Fee,
    pub seller_fee: Fee,
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Match[{}] {} @ {} => priority {} / non-priority {}",
            self.mode,
            self.volume,
            self.clearing_price,
            self.priority_volume,
            self.non_priority_volume,
        )
    }
}

/// A single balance movement, in the token's native unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub token: TokenCode,
    pub from: TraderId,
    pub to: TraderId,
    pub amount: u128,
}

impl Transfer {
    #[must_use]
    pub fn new(token: TokenCode, from: TraderId, to: TraderId, amount: u128) -> Self {
        Self {
            token,
            from,
            to,
            amount,
        }
    }
}

/// Everything the ledger needs to settle one matched pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInstructions {
    pub buy_order: OrderId,
    pub sell_order: OrderId,
    pub buyer: TraderId,
    pub seller: TraderId,
    pub result: MatchResult,
    /// Applied atomically: either all of them or none.
    pub transfers: Vec<Transfer>,
}

impl SettlementInstructions {
    /// Net amount of `token` leaving `trader` across all transfers.
    #[must_use]
    pub fn debited(&self, trader: TraderId, token: TokenCode) -> u128 {
        self.transfers
            .iter()
            .filter(|t| t.from == trader && t.token == token)
            .map(|t| t.amount)
            .sum()
    }

    /// Amount of `token` arriving at `trader` across all transfers.
    #[must_use]
    pub fn credited(&self, trader: TraderId, token: TokenCode) -> u128 {
        self.transfers
            .iter()
            .filter(|t| t.to == trader && t.token == token)
            .map(|t| t.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result() -> MatchResult {
        MatchResult {
            mode: SettlementMode::Standard,
            clearing_price: Fixed::new(9_750_000_000_000, 13),
            volume: Volume::from_raw(1_000_000_000_000),
            priority_volume: Fixed::new(975_000_000, 9),
            non_priority_volume: Fixed::new(1_000_000_000_000_000_000, 18),
            buyer_fee: Fee {
                token: TokenCode::REN,
                amount: Fixed::new(2_000_000_000_000_000, 18),
            },
            seller_fee: Fee {
                token: TokenCode::DGX,
                amount: Fixed::new(1_950_000, 9),
            },
        }
    }

    #[test]
    fn match_result_display() {
        let s = format!("{}", make_result());
        assert!(s.contains("STANDARD"));
        assert!(s.contains("0.975"));
    }

    #[test]
    fn instructions_sum_debits_and_credits() {
        let buyer = TraderId::new();
        let seller = TraderId::new();
        let fees = TraderId::new();
        let instructions = SettlementInstructions {
            buy_order: OrderId::new(),
            sell_order: OrderId::new(),
            buyer,
            seller,
            result: make_result(),
            transfers: vec![
                Transfer::new(TokenCode::DGX, buyer, seller, 973_050_000),
                Transfer::new(TokenCode::DGX, buyer, fees, 1_950_000),
            ],
        };
        assert_eq!(instructions.debited(buyer, TokenCode::DGX), 975_000_000);
        assert_eq!(instructions.credited(seller, TokenCode::DGX), 973_050_000);
        assert_eq!(instructions.credited(fees, TokenCode::DGX), 1_950_000);
        assert_eq!(instructions.debited(seller, TokenCode::DGX), 0);
    }

    #[test]
    fn match_result_serde_roundtrip() {
        let result = make_result();
        let json = serde_json::to_string(&result).unwrap();
        let back: MatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}
