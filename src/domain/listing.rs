use chrono::{DateTime, Local};

/// Placeholder for fields that have no equivalent on a page region,
/// distinct from an extraction failure (empty text).
pub const NOT_AVAILABLE: &str = "Not Available";

const SOLD_BY_PREFIX: &str = "Sold by ";

pub const CSV_HEADER: [&str; 15] = [
    "Card Name",
    "Seller Name",
    "Condition",
    "Price",
    "Quantity Available",
    "Is Direct Seller",
    "Is Hobby Shop",
    "Is Gold Star Seller",
    "Seller Rating",
    "Shipping Price",
    "Total Sales",
    "Is Buy Box Seller",
    "Date",
    "Time",
    "Location",
];

/// Run-scoped metadata stamped onto every row of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub date: String,
    pub time: String,
    pub location: String,
}

impl RunMetadata {
    pub fn new(started_at: &DateTime<Local>, location: String) -> Self {
        RunMetadata {
            date: started_at.format("%Y-%m-%d").to_string(),
            time: started_at.format("%H:%M:%S").to_string(),
            location,
        }
    }
}

/// Field texts and badge flags exactly as pulled off the page, before any
/// cleanup. Absent fields arrive as empty strings.
#[derive(Debug, Clone, Default)]
pub struct RawListing {
    pub seller_name: String,
    pub condition: String,
    pub price: String,
    pub quantity: String,
    pub is_direct: bool,
    pub is_hobby_shop: bool,
    pub is_gold_star: bool,
    pub seller_rating: String,
    pub shipping_price: String,
    pub total_sales: String,
}

/// One seller's offer on one target, normalized and ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub card_name: String,
    pub seller_name: String,
    pub condition: String,
    pub price: String,
    pub quantity: String,
    pub is_direct: bool,
    pub is_hobby_shop: bool,
    pub is_gold_star: bool,
    pub seller_rating: String,
    pub shipping_price: String,
    pub total_sales: String,
    pub is_buy_box: bool,
    pub metadata: RunMetadata,
}

impl ListingRecord {
    /// Builds a record for a regular listing row. The buy-box flag is plain
    /// string equality against the spotlighted seller's cleaned name; ties
    /// or renamed sellers can yield zero or duplicate flags.
    pub fn from_raw(
        card_name: &str,
        raw: RawListing,
        spotlight_seller: &str,
        meta: &RunMetadata,
    ) -> Self {
        let seller_name = clean_seller_name(&raw.seller_name);
        ListingRecord {
            card_name: card_name.to_string(),
            is_buy_box: seller_name == spotlight_seller,
            seller_name,
            condition: raw.condition,
            price: raw.price,
            quantity: trailing_quantity(&raw.quantity),
            is_direct: raw.is_direct,
            is_hobby_shop: raw.is_hobby_shop,
            is_gold_star: raw.is_gold_star,
            seller_rating: raw.seller_rating,
            shipping_price: raw.shipping_price,
            total_sales: clean_total_sales(&raw.total_sales),
            metadata: meta.clone(),
        }
    }

    /// Builds the synthetic record for the spotlighted offer. Always flagged
    /// as the buy box; rating and sales have no equivalent in the spotlight
    /// section so both carry the sentinel.
    pub fn from_spotlight(card_name: &str, raw: RawListing, meta: &RunMetadata) -> Self {
        ListingRecord {
            card_name: card_name.to_string(),
            seller_name: clean_seller_name(&raw.seller_name),
            condition: raw.condition,
            price: raw.price,
            quantity: trailing_quantity(&raw.quantity),
            is_direct: raw.is_direct,
            is_hobby_shop: false,
            is_gold_star: false,
            seller_rating: NOT_AVAILABLE.to_string(),
            shipping_price: raw.shipping_price,
            total_sales: NOT_AVAILABLE.to_string(),
            is_buy_box: true,
            metadata: meta.clone(),
        }
    }

    pub fn to_row(&self) -> [String; 15] {
        [
            self.card_name.clone(),
            self.seller_name.clone(),
            self.condition.clone(),
            self.price.clone(),
            self.quantity.clone(),
            fmt_bool(self.is_direct),
            fmt_bool(self.is_hobby_shop),
            fmt_bool(self.is_gold_star),
            self.seller_rating.clone(),
            self.shipping_price.clone(),
            self.total_sales.clone(),
            fmt_bool(self.is_buy_box),
            self.metadata.date.clone(),
            self.metadata.time.clone(),
            self.metadata.location.clone(),
        ]
    }
}

fn fmt_bool(value: bool) -> String {
    match value {
        true => "TRUE".to_string(),
        false => "FALSE".to_string(),
    }
}

pub fn clean_seller_name(text: &str) -> String {
    text.strip_prefix(SOLD_BY_PREFIX).unwrap_or(text).to_string()
}

/// The quantity text is phrased as a sentence ("Only 3 left!"); only the
/// trailing number matters. Takes the last whitespace-separated token that
/// carries a digit, falling back to the last token for digitless text.
/// Empty input stays empty, never "0".
pub fn trailing_quantity(text: &str) -> String {
    text.split_whitespace()
        .rev()
        .find(|token| token.chars().any(|c| c.is_ascii_digit()))
        .or_else(|| text.split_whitespace().next_back())
        .unwrap_or_default()
        .to_string()
}

pub fn clean_total_sales(text: &str) -> String {
    if text.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    let text = text.strip_prefix('(').unwrap_or(text);
    let text = text.strip_suffix(')').unwrap_or(text);
    text.to_string()
}
