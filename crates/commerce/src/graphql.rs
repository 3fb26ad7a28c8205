//! GraphQL-over-HTTP implementation of [`CommerceApi`].

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use storefront_primitives::cart::{Cart, CartLine, CartLineInput, CartRef};
use storefront_primitives::money::{Money, PriceRange};
use storefront_primitives::product::{Product, ProductOption, Variant};
use tracing::debug;
use url::Url;

use crate::config::CommerceConfig;
use crate::retry::{Replay, RetryPolicy};
use crate::{queries, CommerceApi, CommerceError};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

#[derive(Clone, Debug)]
pub struct GraphQlClient {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
    retry: RetryPolicy,
}

impl GraphQlClient {
    pub fn new(config: &CommerceConfig) -> Result<Self, CommerceError> {
        let client = Client::builder().timeout(config.retry.timeout()).build()?;

        Ok(Self {
            client,
            endpoint: config.store_url.clone(),
            access_token: config.storefront_api_token.clone(),
            retry: config.retry,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        replay: Replay,
        query: &'static str,
        variables: Value,
    ) -> Result<T, CommerceError> {
        let body = &json!({ "query": query, "variables": variables });
        let this = self;

        self.retry
            .run(operation, replay, || async move {
                debug!(%operation, endpoint = %this.endpoint, "Sending GraphQL request");

                let mut request = this.client.post(this.endpoint.clone()).json(body);
                if let Some(token) = &this.access_token {
                    request = request.header(ACCESS_TOKEN_HEADER, token);
                }

                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CommerceError::Status(status.as_u16()));
                }

                let text = response.text().await?;
                decode_response(&text)
            })
            .await
    }

    async fn mutate(
        &self,
        operation: &'static str,
        replay: Replay,
        query: &'static str,
        variables: Value,
    ) -> Result<CartRef, CommerceError> {
        let data: HashMap<String, Option<CartPayload>> =
            self.execute(operation, replay, query, variables).await?;

        cart_ref(data, operation)
    }
}

#[async_trait]
impl CommerceApi for GraphQlClient {
    async fn cart_create(&self, lines: &[CartLineInput]) -> Result<CartRef, CommerceError> {
        self.mutate(
            "cartCreate",
            Replay::Unsafe,
            queries::CART_CREATE,
            json!({ "lines": lines }),
        )
        .await
    }

    async fn cart_lines_add(
        &self,
        cart_id: &str,
        lines: &[CartLineInput],
    ) -> Result<CartRef, CommerceError> {
        self.mutate(
            "cartLinesAdd",
            Replay::Unsafe,
            queries::CART_LINES_ADD,
            json!({ "cartId": cart_id, "lines": lines }),
        )
        .await
    }

    async fn cart_lines_remove(
        &self,
        cart_id: &str,
        line_ids: &[String],
    ) -> Result<CartRef, CommerceError> {
        self.mutate(
            "cartLinesRemove",
            Replay::Safe,
            queries::CART_LINES_REMOVE,
            json!({ "cartId": cart_id, "lineIds": line_ids }),
        )
        .await
    }

    async fn cart_lines_update(
        &self,
        cart_id: &str,
        line_id: &str,
        quantity: u32,
    ) -> Result<CartRef, CommerceError> {
        self.mutate(
            "cartLinesUpdate",
            Replay::Safe,
            queries::CART_LINES_UPDATE,
            json!({ "cartId": cart_id, "lineId": line_id, "quantity": quantity }),
        )
        .await
    }

    async fn cart(&self, cart_id: &str) -> Result<Option<Cart>, CommerceError> {
        let data: CartData = self
            .execute("cart", Replay::Safe, queries::CART, json!({ "cartId": cart_id }))
            .await?;

        Ok(data.cart.map(Cart::from))
    }

    async fn product(&self, handle: &str) -> Result<Option<Product>, CommerceError> {
        let data: ProductData = self
            .execute("product", Replay::Safe, queries::PRODUCT, json!({ "handle": handle }))
            .await?;

        Ok(data.product.map(Product::from))
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<Message>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Message {
    message: String,
}

fn join(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn decode_response<T: DeserializeOwned>(text: &str) -> Result<T, CommerceError> {
    let response: GraphQlResponse<T> =
        serde_json::from_str(text).map_err(|err| CommerceError::Decode(err.to_string()))?;

    if !response.errors.is_empty() {
        return Err(CommerceError::GraphQl(join(&response.errors)));
    }

    response
        .data
        .ok_or_else(|| CommerceError::Decode("response carried no data".to_owned()))
}

#[derive(Debug, Deserialize)]
struct CartPayload {
    cart: Option<CartRef>,
    #[serde(rename = "userErrors", default)]
    user_errors: Vec<Message>,
}

fn cart_ref(
    mut data: HashMap<String, Option<CartPayload>>,
    field: &str,
) -> Result<CartRef, CommerceError> {
    let payload = data
        .remove(field)
        .flatten()
        .ok_or(CommerceError::MissingCart)?;

    if !payload.user_errors.is_empty() {
        return Err(CommerceError::UserErrors(join(&payload.user_errors)));
    }

    payload.cart.ok_or(CommerceError::MissingCart)
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CartData {
    cart: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCart {
    id: String,
    checkout_url: Option<String>,
    lines: Nodes<WireLine>,
    cost: WireCost,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCost {
    total_amount: Money,
}

#[derive(Debug, Deserialize)]
struct WireLine {
    id: String,
    quantity: u32,
    merchandise: WireMerchandise,
}

#[derive(Debug, Deserialize)]
struct WireMerchandise {
    id: String,
    title: String,
    image: Option<WireImage>,
    product: WireProductTitle,
    price: Money,
}

#[derive(Debug, Deserialize)]
struct WireImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct WireProductTitle {
    title: String,
}

impl From<WireCart> for Cart {
    fn from(cart: WireCart) -> Self {
        Self {
            id: cart.id,
            checkout_url: cart.checkout_url,
            lines: cart
                .lines
                .nodes
                .into_iter()
                .map(|line| CartLine {
                    id: line.id,
                    merchandise_id: line.merchandise.id,
                    quantity: line.quantity,
                    unit_price: line.merchandise.price,
                    title: line.merchandise.title,
                    product_title: line.merchandise.product.title,
                    image_url: line.merchandise.image.map(|image| image.url),
                })
                .collect(),
            total: cart.cost.total_amount,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductData {
    product: Option<WireProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProduct {
    id: String,
    handle: String,
    title: String,
    price_range: PriceRange,
    options: Vec<ProductOption>,
    variants: Nodes<Variant>,
}

impl From<WireProduct> for Product {
    fn from(product: WireProduct) -> Self {
        Self {
            id: product.id,
            handle: product.handle,
            title: product.title,
            price_range: product.price_range,
            options: product.options,
            variants: product.variants.nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};
    use core::time::Duration;
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::sleep;

    use super::*;

    async fn read_request(socket: &mut TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0_u8; 1024];

        loop {
            let Ok(read) = socket.read(&mut chunk).await else {
                return;
            };
            if read == 0 {
                return;
            }
            request.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&request);
            let Some(end) = text.find("\r\n\r\n") else {
                continue;
            };
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            if request.len() >= end + 4 + length {
                return;
            }
        }
    }

    /// Answers every request with `body`, holding the first answer back for
    /// `delay`. Returns the endpoint and the count of requests received.
    async fn store(body: &'static str, delay: Duration) -> (Url, Arc<AtomicU32>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/graphql", listener.local_addr().unwrap())
            .parse()
            .unwrap();
        let received = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&received);

        drop(tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let counter = Arc::clone(&counter);

                drop(tokio::spawn(async move {
                    read_request(&mut socket).await;
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        sleep(delay).await;
                    }

                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                }));
            }
        }));

        (endpoint, received)
    }

    fn client(endpoint: Url) -> GraphQlClient {
        let mut config = CommerceConfig::new(endpoint);
        config.retry = RetryPolicy {
            timeout_ms: 150,
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        };

        GraphQlClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn late_answer_to_lines_add_is_not_resent() {
        let (endpoint, received) = store(
            r#"{"data":{"cartLinesAdd":{"cart":{"id":"cart-123"},"userErrors":[]}}}"#,
            Duration::from_millis(400),
        )
        .await;

        let line = CartLineInput {
            merchandise_id: "gid://shop/ProductVariant/7".to_owned(),
            quantity: 1,
        };
        let result = client(endpoint).cart_lines_add("cart-123", &[line]).await;

        match result {
            Err(CommerceError::Transport(err)) => assert!(err.is_timeout(), "{err}"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(received.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn late_answer_to_lines_remove_is_retried() {
        let (endpoint, received) = store(
            r#"{"data":{"cartLinesRemove":{"cart":{"id":"cart-123"},"userErrors":[]}}}"#,
            Duration::from_millis(400),
        )
        .await;

        let result = client(endpoint)
            .cart_lines_remove("cart-123", &["line-1".to_owned()])
            .await;

        assert_eq!(result.unwrap(), CartRef::new("cart-123"));
        assert_eq!(received.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn mutation_payload_yields_cart_id() {
        let data: HashMap<String, Option<CartPayload>> = decode_response(
            r#"{"data":{"cartLinesAdd":{"cart":{"id":"cart-123"},"userErrors":[]}}}"#,
        )
        .unwrap();

        assert_eq!(cart_ref(data, "cartLinesAdd").unwrap(), CartRef::new("cart-123"));
    }

    #[test]
    fn user_errors_are_reported() {
        let data: HashMap<String, Option<CartPayload>> = decode_response(
            r#"{"data":{"cartCreate":{"cart":null,"userErrors":[{"message":"bad variant"},{"message":"sold out"}]}}}"#,
        )
        .unwrap();

        match cart_ref(data, "cartCreate") {
            Err(CommerceError::UserErrors(message)) => assert_eq!(message, "bad variant; sold out"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_cart_is_reported() {
        let data: HashMap<String, Option<CartPayload>> =
            decode_response(r#"{"data":{"cartLinesRemove":null}}"#).unwrap();

        assert!(matches!(
            cart_ref(data, "cartLinesRemove"),
            Err(CommerceError::MissingCart)
        ));
    }

    #[test]
    fn top_level_errors_win() {
        let result: Result<CartData, _> =
            decode_response(r#"{"data":null,"errors":[{"message":"throttled"}]}"#);

        match result {
            Err(CommerceError::GraphQl(message)) => assert_eq!(message, "throttled"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cart_query_is_flattened() {
        let data: CartData = decode_response(
            r#"{"data":{"cart":{
                "id":"cart-123",
                "checkoutUrl":"https://shop.example/checkout/c1",
                "lines":{"nodes":[{
                    "id":"line-1",
                    "quantity":2,
                    "merchandise":{
                        "id":"gid://shopify/ProductVariant/55",
                        "title":"M / Red",
                        "image":{"url":"https://cdn.example/shirt.png"},
                        "product":{"title":"Shirt"},
                        "price":{"amount":"20.0","currencyCode":"USD"}
                    }
                }]},
                "cost":{"totalAmount":{"amount":"40.0","currencyCode":"USD"}}
            }}}"#,
        )
        .unwrap();

        let cart = Cart::from(data.cart.unwrap());

        assert_eq!(cart.id, "cart-123");
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.lines[0].merchandise_id, "gid://shopify/ProductVariant/55");
        assert_eq!(cart.lines[0].product_title, "Shirt");
        assert_eq!(cart.lines[0].image_url.as_deref(), Some("https://cdn.example/shirt.png"));
        assert_eq!(cart.total, Money::new("40.0", "USD"));
    }

    #[test]
    fn unknown_product_is_none() {
        let data: ProductData = decode_response(r#"{"data":{"product":null}}"#).unwrap();

        assert!(data.product.is_none());
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let result: Result<CartData, _> = decode_response("<html>");

        assert!(matches!(result, Err(CommerceError::Decode(_))));
    }
}
