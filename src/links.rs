//! Outbound links: messaging deep links, map embeds, phone and mail.
//!
//! These only build strings; nothing here touches the network.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::catalog::{CatalogItem, Language};

/// Characters left as-is by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// WhatsApp chat with `phone_digits` and `message` pre-filled.
pub fn whatsapp_link(phone_digits: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        phone_digits,
        encode_component(message)
    )
}

/// Pre-filled text for ordering a specific item.
pub fn order_message(item: &CatalogItem, lang: Language) -> String {
    match lang {
        Language::Es => format!("Hola, quiero pedir {} (Código {})", item.name_es, item.code),
        Language::En => format!("Hi, I'm interested in {} (code {})", item.name_en, item.code),
    }
}

/// Pre-filled text for the general contact button.
pub fn general_order_message(lang: Language) -> &'static str {
    lang.pick(
        "Hola, me interesa hacer un pedido",
        "Hi, I want to place an order",
    )
}

/// Embedded map for a free-text address. The address is not validated.
pub fn map_embed_link(address: &str) -> String {
    format!(
        "https://www.google.com/maps?q={}&output=embed",
        encode_component(address)
    )
}

pub fn tel_link(phone: &str) -> String {
    format!("tel:{}", phone)
}

pub fn mailto_link(email: &str) -> String {
    format!("mailto:{}", email)
}
