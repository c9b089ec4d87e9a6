use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const DEFAULT_WHATSAPP_NUMBER: &str = "2520633916396";

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Link that opens a WhatsApp chat with `message` pre-filled.
pub fn whatsapp_link(message: &str, phone_number: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        phone_number,
        utf8_percent_encode(message, COMPONENT)
    )
}
