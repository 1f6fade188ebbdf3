//! Typed model of the browser-side checkout handshake.
//!
//! The server never drives this machine itself; it is the contract the
//! storefront client follows, and `CheckoutOptions` is the exact object the
//! intake endpoint hands back for the hosted payment UI constructor.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    Idle,
    ScriptLoading,
    AwaitingIntake,
    HostedUiOpen,
    VerifyingPayment,
    Confirmed,
    Cancelled,
    VerificationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// User submitted the checkout form.
    Submit,
    ScriptLoaded,
    ScriptFailed,
    IntakeSucceeded,
    IntakeFailed,
    /// Gateway success callback with {order id, payment id, signature}.
    PaymentSucceeded,
    /// User dismissed the hosted UI.
    Dismissed,
    VerificationSucceeded,
    VerificationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event {event:?} is not valid in phase {phase:?}")]
pub struct IllegalTransition {
    pub phase: CheckoutPhase,
    pub event: CheckoutEvent,
}

impl CheckoutPhase {
    /// Apply one event. Script-load and intake failures surface an error to
    /// the user and drop back to Idle so checkout can be retried; the three
    /// terminal phases accept no further events.
    pub fn apply(self, event: CheckoutEvent) -> Result<CheckoutPhase, IllegalTransition> {
        use CheckoutEvent::*;
        use CheckoutPhase::*;
        match (self, event) {
            (Idle, Submit) => Ok(ScriptLoading),
            (ScriptLoading, ScriptLoaded) => Ok(AwaitingIntake),
            (ScriptLoading, ScriptFailed) => Ok(Idle),
            (AwaitingIntake, IntakeSucceeded) => Ok(HostedUiOpen),
            (AwaitingIntake, IntakeFailed) => Ok(Idle),
            (HostedUiOpen, PaymentSucceeded) => Ok(VerifyingPayment),
            (HostedUiOpen, Dismissed) => Ok(Cancelled),
            (VerifyingPayment, VerificationSucceeded) => Ok(Confirmed),
            (VerifyingPayment, CheckoutEvent::VerificationFailed) => {
                Ok(CheckoutPhase::VerificationFailed)
            }
            (phase, event) => Err(IllegalTransition { phase, event }),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CheckoutPhase::Confirmed | CheckoutPhase::Cancelled | CheckoutPhase::VerificationFailed
        )
    }
}

/// Field names follow the gateway's hosted UI constructor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutOptions {
    /// Publishable gateway key.
    pub key: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    /// Gateway order id, not the internal order id.
    pub order_id: String,
    /// Store name shown in the hosted UI header.
    pub name: String,
    pub prefill: CheckoutPrefill,
    pub theme: CheckoutTheme,
    /// Internal order id, echoed back so the confirmation page can be keyed.
    pub order_ref: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutTheme {
    pub color: String,
}

impl Default for CheckoutTheme {
    fn default() -> Self {
        Self {
            color: "#9D174D".to_string(),
        }
    }
}
