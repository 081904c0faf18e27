//! Payment processor client.
//!
//! Order creation asks the processor to authorize the computed total and
//! stores the returned client secret on the order.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_core::Currency;

/// Authorization handle for a pending payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub client_secret: String,
    pub amount: u64,
    pub currency: Currency,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment processor unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    async fn authorize(&self, amount: u64, currency: &Currency) -> Result<PaymentIntent, PaymentError>;
}

#[async_trait]
impl<P> PaymentAuthorizer for Arc<P>
where
    P: PaymentAuthorizer + ?Sized,
{
    async fn authorize(&self, amount: u64, currency: &Currency) -> Result<PaymentIntent, PaymentError> {
        (**self).authorize(amount, currency).await
    }
}

/// Local stand-in for a processor: issues random client secrets.
///
/// Declines a zero amount, which a real processor would also refuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakePaymentAuthorizer;

#[async_trait]
impl PaymentAuthorizer for FakePaymentAuthorizer {
    async fn authorize(&self, amount: u64, currency: &Currency) -> Result<PaymentIntent, PaymentError> {
        if amount == 0 {
            return Err(PaymentError::Declined("amount must be positive".to_string()));
        }
        let client_secret = format!("pi_{}_secret_{}", uuid::Uuid::now_v7().simple(), uuid::Uuid::new_v4().simple());
        tracing::debug!(amount, currency = %currency, "fake payment intent issued");
        Ok(PaymentIntent {
            client_secret,
            amount,
            currency: currency.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_issues_distinct_secrets() {
        let pkr = Currency::new("PKR").unwrap();
        let a = FakePaymentAuthorizer.authorize(215, &pkr).await.unwrap();
        let b = FakePaymentAuthorizer.authorize(215, &pkr).await.unwrap();

        assert_eq!(a.amount, 215);
        assert_eq!(a.currency, pkr);
        assert_ne!(a.client_secret, b.client_secret);
    }

    #[tokio::test]
    async fn fake_declines_zero() {
        let pkr = Currency::new("PKR").unwrap();
        assert!(matches!(
            FakePaymentAuthorizer.authorize(0, &pkr).await,
            Err(PaymentError::Declined(_))
        ));
    }
}
