use crate::error::OrderError;
use crate::models::OrderStatus;

/// Admin actions on a placed order.
///
/// Pending → Accepted → Delivered, or Pending → Rejected. Rejected and Delivered are
/// terminal. Every action is valid from exactly one source status, so repeating an action
/// that already succeeded is refused instead of being applied twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Accept,
    Reject,
    Deliver,
}

impl LifecycleAction {
    /// Status the order must currently be in
    pub fn source(self) -> OrderStatus {
        match self {
            LifecycleAction::Accept | LifecycleAction::Reject => OrderStatus::Pending,
            LifecycleAction::Deliver => OrderStatus::Accepted,
        }
    }

    pub fn target(self) -> OrderStatus {
        match self {
            LifecycleAction::Accept => OrderStatus::Accepted,
            LifecycleAction::Reject => OrderStatus::Rejected,
            LifecycleAction::Deliver => OrderStatus::Delivered,
        }
    }

    /// Only rejection gives stock back; placement already debited it.
    pub fn restores_stock(self) -> bool {
        matches!(self, LifecycleAction::Reject)
    }

    /// Delivery keeps whatever notes were written on accept.
    pub fn records_notes(self) -> bool {
        !matches!(self, LifecycleAction::Deliver)
    }

    /// Validates the transition out of `current`.
    pub fn apply(self, current: OrderStatus) -> Result<OrderStatus, OrderError> {
        if current != self.source() {
            return Err(OrderError::InvalidTransition {
                from: current,
                to: self.target(),
            });
        }
        Ok(self.target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_lifecycle() {
        // Pending → Accepted
        let status = LifecycleAction::Accept.apply(OrderStatus::Pending).unwrap();
        assert_eq!(status, OrderStatus::Accepted);

        // Accepted → Delivered
        let status = LifecycleAction::Deliver.apply(status).unwrap();
        assert_eq!(status, OrderStatus::Delivered);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_reject_only_from_pending() {
        assert_eq!(
            LifecycleAction::Reject.apply(OrderStatus::Pending).unwrap(),
            OrderStatus::Rejected
        );

        for from in [OrderStatus::Accepted, OrderStatus::Rejected, OrderStatus::Delivered] {
            let err = LifecycleAction::Reject.apply(from).unwrap_err();
            assert!(matches!(
                err,
                OrderError::InvalidTransition { to: OrderStatus::Rejected, .. }
            ));
        }
    }

    #[test]
    fn test_invalid_transition() {
        // Cannot deliver an order nobody accepted
        let result = LifecycleAction::Deliver.apply(OrderStatus::Pending);
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered
            })
        ));

        // Accepting twice is refused
        assert!(LifecycleAction::Accept.apply(OrderStatus::Accepted).is_err());
    }

    #[test]
    fn test_stock_and_notes_flags() {
        assert!(LifecycleAction::Reject.restores_stock());
        assert!(!LifecycleAction::Accept.restores_stock());
        assert!(!LifecycleAction::Deliver.restores_stock());
        assert!(!LifecycleAction::Deliver.records_notes());
    }
}
