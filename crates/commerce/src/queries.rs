pub(crate) const CART_CREATE: &str = r"
mutation CreateCart($lines: [CartLineInput!]!) {
  cartCreate(input: { lines: $lines }) {
    cart { id }
    userErrors { message }
  }
}";

pub(crate) const CART_LINES_ADD: &str = r"
mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { id }
    userErrors { message }
  }
}";

pub(crate) const CART_LINES_REMOVE: &str = r"
mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { id }
    userErrors { message }
  }
}";

pub(crate) const CART_LINES_UPDATE: &str = r"
mutation SetLineQuantity($cartId: ID!, $lineId: ID!, $quantity: Int!) {
  cartLinesUpdate(cartId: $cartId, lines: { id: $lineId, quantity: $quantity }) {
    cart { id }
    userErrors { message }
  }
}";

pub(crate) const CART: &str = r"
query Cart($cartId: ID!) {
  cart(id: $cartId) {
    id
    checkoutUrl
    lines(first: 100) {
      nodes {
        id
        quantity
        merchandise {
          ... on ProductVariant {
            id
            title
            image { url(transform: { maxWidth: 256 }) }
            product { title }
            price { amount currencyCode }
          }
        }
      }
    }
    cost {
      totalAmount { amount currencyCode }
    }
  }
}";

pub(crate) const PRODUCT: &str = r"
query ProductOptions($handle: String!) {
  product(handle: $handle) {
    id
    handle
    title
    priceRange {
      maxVariantPrice { amount currencyCode }
      minVariantPrice { amount currencyCode }
    }
    options {
      id
      name
      optionValues { id name }
    }
    variants(first: 100) {
      nodes {
        id
        title
        selectedOptions { name value }
        price { amount currencyCode }
        availableForSale
      }
    }
  }
}";
