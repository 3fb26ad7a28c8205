//! In-memory commerce backend for local development and tests
//!
//! Carts live in a map keyed by id and every call is recorded, so callers can
//! assert which remote operations a flow performed. Failures and foreign cart
//! ids can be injected to exercise the error paths.

use core::iter::repeat;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use storefront_primitives::cart::{Cart, CartLine, CartLineInput, CartRef};
use storefront_primitives::money::Money;
use storefront_primitives::product::Product;
use tokio::sync::RwLock;

use crate::{CommerceApi, CommerceError};

/// A remote call observed by [`MockCommerce`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MockCall {
    CartCreate {
        lines: Vec<CartLineInput>,
    },
    CartLinesAdd {
        cart_id: String,
        lines: Vec<CartLineInput>,
    },
    CartLinesRemove {
        cart_id: String,
        line_ids: Vec<String>,
    },
    CartLinesUpdate {
        cart_id: String,
        line_id: String,
        quantity: u32,
    },
    Cart {
        cart_id: String,
    },
    Product {
        handle: String,
    },
}

#[derive(Clone, Debug)]
struct Merchandise {
    title: String,
    product_title: String,
    price: Money,
}

#[derive(Debug, Default)]
struct MockState {
    carts: HashMap<String, Cart>,
    products: HashMap<String, Product>,
    merchandise: HashMap<String, Merchandise>,
    calls: Vec<MockCall>,
    next_cart: u64,
    next_line: u64,
    fail_next: Option<String>,
    fail_always: Option<String>,
    answer_with: Option<String>,
}

impl MockState {
    fn record(&mut self, call: MockCall) -> Result<(), CommerceError> {
        self.calls.push(call);

        if let Some(reason) = self.fail_next.take().or_else(|| self.fail_always.clone()) {
            return Err(CommerceError::Unavailable(reason));
        }

        Ok(())
    }

    fn answer(&self, cart_id: &str) -> CartRef {
        CartRef::new(self.answer_with.as_deref().unwrap_or(cart_id))
    }

    fn add_lines(&mut self, cart_id: &str, lines: &[CartLineInput]) -> Result<(), CommerceError> {
        let mut resolved = Vec::with_capacity(lines.len());
        for input in lines {
            let merchandise = self.merchandise.get(&input.merchandise_id).ok_or_else(|| {
                CommerceError::UserErrors(format!(
                    "The merchandise with id {} does not exist.",
                    input.merchandise_id
                ))
            })?;
            resolved.push((input, merchandise.clone()));
        }

        for (input, merchandise) in resolved {
            let cart = self.carts.get_mut(cart_id).ok_or_else(missing_cart)?;

            if let Some(line) = cart
                .lines
                .iter_mut()
                .find(|line| line.merchandise_id == input.merchandise_id)
            {
                line.quantity += input.quantity;
                continue;
            }

            self.next_line += 1;
            let line_id = format!("gid://shop/CartLine/{}", self.next_line);
            let cart = self.carts.get_mut(cart_id).ok_or_else(missing_cart)?;
            cart.lines.push(CartLine {
                id: line_id,
                merchandise_id: input.merchandise_id.clone(),
                quantity: input.quantity,
                unit_price: merchandise.price,
                title: merchandise.title,
                product_title: merchandise.product_title,
                image_url: None,
            });
        }

        self.reprice(cart_id);

        Ok(())
    }

    fn reprice(&mut self, cart_id: &str) {
        let Some(cart) = self.carts.get_mut(cart_id) else {
            return;
        };

        let mut cents = 0_i64;
        for line in &cart.lines {
            cents += to_cents(&line.unit_price.amount) * i64::from(line.quantity);
        }

        let currency = cart
            .lines
            .first()
            .map_or_else(|| cart.total.currency_code.clone(), |line| line.unit_price.currency_code.clone());

        cart.total = Money::new(format!("{}.{:02}", cents / 100, cents % 100), currency);
    }
}

fn missing_cart() -> CommerceError {
    CommerceError::UserErrors("The specified cart does not exist.".to_owned())
}

/// Decimal amount in cents, half up past the second fraction digit. Anything
/// unparseable counts as zero.
fn to_cents(amount: &str) -> i64 {
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let negative = whole.starts_with('-');

    let Ok(whole) = whole.parse::<i64>() else {
        return 0;
    };

    let mut digits = fraction.chars().chain(repeat('0'));
    let mut cents = 0_i64;
    for digit in digits.by_ref().take(2) {
        let Some(digit) = digit.to_digit(10) else {
            return 0;
        };
        cents = cents * 10 + i64::from(digit);
    }
    if digits.next().and_then(|digit| digit.to_digit(10)) >= Some(5) {
        cents += 1;
    }

    let cents = whole.saturating_abs().saturating_mul(100).saturating_add(cents);
    if negative {
        -cents
    } else {
        cents
    }
}

/// In-memory [`CommerceApi`] implementation.
#[derive(Clone, Debug, Default)]
pub struct MockCommerce {
    state: Arc<RwLock<MockState>>,
}

impl MockCommerce {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product and makes its variants purchasable.
    pub async fn add_product(&self, product: Product) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        for variant in &product.variants {
            drop(state.merchandise.insert(
                variant.id.clone(),
                Merchandise {
                    title: variant.title.clone(),
                    product_title: product.title.clone(),
                    price: variant.price.clone(),
                },
            ));
        }

        drop(state.products.insert(product.handle.clone(), product));
    }

    /// Seeds a cart as if it had been created earlier.
    pub async fn insert_cart(&self, cart: Cart) {
        drop(self.state.write().await.carts.insert(cart.id.clone(), cart));
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn stored_cart(&self, cart_id: &str) -> Option<Cart> {
        self.state.read().await.carts.get(cart_id).cloned()
    }

    /// Makes the next call fail with a transient error.
    pub async fn fail_next(&self, reason: impl Into<String>) {
        self.state.write().await.fail_next = Some(reason.into());
    }

    /// Makes every call fail until [`MockCommerce::recover`] is called.
    pub async fn fail_always(&self, reason: impl Into<String>) {
        self.state.write().await.fail_always = Some(reason.into());
    }

    pub async fn recover(&self) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.fail_next = None;
        state.fail_always = None;
    }

    /// Answers every cart operation with the given id instead of the real
    /// one, the way a stale or hijacked session would observe it.
    pub async fn answer_with_cart_id(&self, cart_id: impl Into<String>) {
        self.state.write().await.answer_with = Some(cart_id.into());
    }
}

#[async_trait]
impl CommerceApi for MockCommerce {
    async fn cart_create(&self, lines: &[CartLineInput]) -> Result<CartRef, CommerceError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.record(MockCall::CartCreate {
            lines: lines.to_vec(),
        })?;

        state.next_cart += 1;
        let cart_id = format!("gid://shop/Cart/{}", state.next_cart);
        let checkout_url = format!("https://checkout.example/cart/{}", state.next_cart);
        drop(state.carts.insert(
            cart_id.clone(),
            Cart {
                id: cart_id.clone(),
                checkout_url: Some(checkout_url),
                lines: Vec::new(),
                total: Money::zero("USD"),
            },
        ));

        if let Err(err) = state.add_lines(&cart_id, lines) {
            drop(state.carts.remove(&cart_id));
            return Err(err);
        }

        Ok(state.answer(&cart_id))
    }

    async fn cart_lines_add(
        &self,
        cart_id: &str,
        lines: &[CartLineInput],
    ) -> Result<CartRef, CommerceError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.record(MockCall::CartLinesAdd {
            cart_id: cart_id.to_owned(),
            lines: lines.to_vec(),
        })?;

        state.add_lines(cart_id, lines)?;

        Ok(state.answer(cart_id))
    }

    async fn cart_lines_remove(
        &self,
        cart_id: &str,
        line_ids: &[String],
    ) -> Result<CartRef, CommerceError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.record(MockCall::CartLinesRemove {
            cart_id: cart_id.to_owned(),
            line_ids: line_ids.to_vec(),
        })?;

        let cart = state.carts.get_mut(cart_id).ok_or_else(missing_cart)?;
        cart.lines.retain(|line| !line_ids.contains(&line.id));
        state.reprice(cart_id);

        Ok(state.answer(cart_id))
    }

    async fn cart_lines_update(
        &self,
        cart_id: &str,
        line_id: &str,
        quantity: u32,
    ) -> Result<CartRef, CommerceError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.record(MockCall::CartLinesUpdate {
            cart_id: cart_id.to_owned(),
            line_id: line_id.to_owned(),
            quantity,
        })?;

        let cart = state.carts.get_mut(cart_id).ok_or_else(missing_cart)?;
        let line = cart
            .lines
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or_else(|| CommerceError::UserErrors(format!("The line {line_id} does not exist.")))?;

        if quantity == 0 {
            cart.lines.retain(|line| line.id != line_id);
        } else {
            line.quantity = quantity;
        }
        state.reprice(cart_id);

        Ok(state.answer(cart_id))
    }

    async fn cart(&self, cart_id: &str) -> Result<Option<Cart>, CommerceError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.record(MockCall::Cart {
            cart_id: cart_id.to_owned(),
        })?;

        let answer = state.answer(cart_id);
        Ok(state.carts.get(cart_id).cloned().map(|mut cart| {
            cart.id = answer.id;
            cart
        }))
    }

    async fn product(&self, handle: &str) -> Result<Option<Product>, CommerceError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.record(MockCall::Product {
            handle: handle.to_owned(),
        })?;

        Ok(state.products.get(handle).cloned())
    }
}
