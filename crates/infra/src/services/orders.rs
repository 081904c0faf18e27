//! Order placement and payment confirmation.

use chrono::Utc;
use tracing::instrument;

use storefront_auth::{authorize_owned, require_privileged, Principal};
use storefront_core::{Currency, OrderId};
use storefront_orders::{CreateOrder, Order, OrderStatus};

use crate::catalog::ProductCatalog;
use crate::payment::PaymentAuthorizer;
use crate::store::{OrderFilter, OrderStore};

use super::{ServiceError, ServiceResult};

/// Turns carts into priced, payment-authorized orders.
///
/// Generic over its collaborators so tests can swap in fakes; the API holds it
/// behind `Arc<dyn ...>` ports.
#[derive(Debug, Clone)]
pub struct OrderService<C, P, S> {
    catalog: C,
    payments: P,
    store: S,
    currency: Currency,
}

impl<C, P, S> OrderService<C, P, S>
where
    C: ProductCatalog,
    P: PaymentAuthorizer,
    S: OrderStore,
{
    pub fn new(catalog: C, payments: P, store: S, currency: Currency) -> Self {
        Self {
            catalog,
            payments,
            store,
            currency,
        }
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Validate the cart, price it from the catalog, authorize the total, and
    /// persist a pending order owned by the caller.
    ///
    /// Nothing is written unless every step succeeds. Products are resolved in
    /// cart order and the first unknown one aborts the request.
    #[instrument(skip(self, request), fields(user_id = %principal.user_id), err)]
    pub async fn create_order(&self, principal: &Principal, request: CreateOrder) -> ServiceResult<Order> {
        let cart = request.validate()?;

        let mut draft = cart.draft();
        for line in cart.items() {
            let product = self
                .catalog
                .find_product(line.product)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("no product with id: {}", line.product)))?;
            draft.add_line(line, &product)?;
        }

        let total = draft.total()?;
        let intent = self.payments.authorize(total, &self.currency).await?;

        let order = draft.into_order(OrderId::new(), principal.user_id, intent.client_secret, Utc::now())?;
        let order = self.store.insert(order).await?;

        tracing::info!(
            order_id = %order.id_typed(),
            lines = order.items().len(),
            total = order.total(),
            currency = %self.currency,
            "order created"
        );
        Ok(order)
    }

    /// Every order in the store; privileged callers only.
    pub async fn list_all_orders(&self, principal: &Principal) -> ServiceResult<Vec<Order>> {
        require_privileged(principal)?;
        Ok(self.store.list(OrderFilter::All).await?)
    }

    pub async fn list_orders_for_user(&self, principal: &Principal) -> ServiceResult<Vec<Order>> {
        Ok(self.store.list(OrderFilter::Owner(principal.user_id)).await?)
    }

    pub async fn get_order(&self, id: OrderId, principal: &Principal) -> ServiceResult<Order> {
        let order = self.load(id).await?;
        authorize_owned(principal, &order)?;
        Ok(order)
    }

    /// Attach the processor's confirmation id and mark the order paid.
    #[instrument(skip(self, payment_intent_id), fields(user_id = %principal.user_id), err)]
    pub async fn confirm_payment(
        &self,
        id: OrderId,
        payment_intent_id: &str,
        principal: &Principal,
    ) -> ServiceResult<Order> {
        let mut order = self.load(id).await?;
        authorize_owned(principal, &order)?;

        order.mark_paid(payment_intent_id, Utc::now())?;
        let order = self.store.save(order, OrderStatus::Pending).await?;

        tracing::info!(order_id = %id, "order paid");
        Ok(order)
    }

    async fn load(&self, id: OrderId) -> ServiceResult<Order> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("no order with id: {id}")))
    }
}
