use thirtyfour::By;

/// A structural handle into the remote page's markup. The paths here are
/// brittle by nature; keeping them as data means a markup change is a table
/// edit, not a logic change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Css(&'static str),
    XPath(&'static str),
    Id(&'static str),
}

impl Locator {
    pub fn to_by(self) -> By {
        match self {
            Locator::Css(selector) => By::Css(selector),
            Locator::XPath(path) => By::XPath(path),
            Locator::Id(id) => By::Id(id),
        }
    }
}

/// How to locate one field inside a region: either a structural path, or a
/// scan of candidate regions for a content keyword. Content match is the
/// fallback for fields with no stable structural marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    Structural(Locator),
    ContentMatch {
        scope: Locator,
        pattern: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub descriptor: Descriptor,
}

/// Case-insensitive substring match against normalized text.
pub fn text_matches(text: &str, pattern: &str) -> bool {
    text.trim().to_lowercase().contains(&pattern.to_lowercase())
}

// Page identity and shared regions.

pub const ITEM_TITLE_PATH: Locator =
    Locator::XPath("//*[@id=\"app\"]/div/div/section[2]/section/div/div[2]/div/h1");

pub const ITEM_TITLE: FieldDescriptor = FieldDescriptor {
    name: "Card Name",
    descriptor: Descriptor::Structural(ITEM_TITLE_PATH),
};

pub const LISTING_ROWS: Locator =
    Locator::Css("div.product-details__listings-results section.listing-item");

pub const NEXT_PAGE: Locator = Locator::XPath(
    "/html/body/div[2]/div/div/section[2]/section/section[1]/section/section/section/div[2]/a[2]",
);

// One-time page adjustments.

pub const VERIFIED_SELLER_FILTER: Locator = Locator::Id("verified-seller-filter");

pub const PAGE_SIZE_MAX_OPTION: Locator =
    Locator::XPath("//select[@id='listings-per-page']/option[last()]");

// Spotlighted (buy box) offer fields.

pub const SPOTLIGHT_SELLER: FieldDescriptor = FieldDescriptor {
    name: "Buy Box Seller",
    descriptor: Descriptor::Structural(Locator::XPath(
        "//*[@id=\"app\"]/div/div/section[2]/section/div/div[2]/section[2]/section[1]/div/section[3]",
    )),
};

pub const SPOTLIGHT_CONDITION: FieldDescriptor = FieldDescriptor {
    name: "Buy Box Condition",
    descriptor: Descriptor::Structural(Locator::Css(".spotlight__condition")),
};

pub const SPOTLIGHT_PRICE: FieldDescriptor = FieldDescriptor {
    name: "Buy Box Price",
    descriptor: Descriptor::Structural(Locator::Css(".spotlight__price")),
};

pub const SPOTLIGHT_QUANTITY: FieldDescriptor = FieldDescriptor {
    name: "Buy Box Quantity",
    descriptor: Descriptor::Structural(Locator::Css(".add-to-cart__available")),
};

pub const SPOTLIGHT_SHIPPING: FieldDescriptor = FieldDescriptor {
    name: "Buy Box Shipping",
    descriptor: Descriptor::ContentMatch {
        scope: Locator::XPath("//section[contains(@class, 'spotlight')]//span"),
        pattern: "shipping",
    },
};

pub const SPOTLIGHT_DIRECT_BANNER: FieldDescriptor = FieldDescriptor {
    name: "Buy Box Direct Banner",
    descriptor: Descriptor::Structural(Locator::Css(".spotlight__banner.direct")),
};

// Regular listing row fields, resolved relative to one row region.

pub const SELLER_NAME: FieldDescriptor = FieldDescriptor {
    name: "Seller Name",
    descriptor: Descriptor::Structural(Locator::Css(".seller-info__name")),
};

pub const CONDITION: FieldDescriptor = FieldDescriptor {
    name: "Condition",
    descriptor: Descriptor::Structural(Locator::Css(
        ".listing-item__listing-data__info__condition a",
    )),
};

pub const PRICE: FieldDescriptor = FieldDescriptor {
    name: "Price",
    descriptor: Descriptor::Structural(Locator::Css(".listing-item__listing-data__info__price")),
};

pub const QUANTITY: FieldDescriptor = FieldDescriptor {
    name: "Quantity",
    descriptor: Descriptor::Structural(Locator::Css(".add-to-cart__available")),
};

pub const DIRECT_BADGE: FieldDescriptor = FieldDescriptor {
    name: "Direct Seller Badge",
    descriptor: Descriptor::Structural(Locator::Css("img[alt='Direct Seller']")),
};

pub const HOBBY_SHOP_BADGE: FieldDescriptor = FieldDescriptor {
    name: "Certified Hobby Shop Badge",
    descriptor: Descriptor::Structural(Locator::Css("img[alt='Certified Hobby Shop']")),
};

pub const GOLD_STAR_BADGE: FieldDescriptor = FieldDescriptor {
    name: "Gold Star Seller Badge",
    descriptor: Descriptor::Structural(Locator::Css("img[alt='Gold Star Seller']")),
};

pub const SELLER_RATING: FieldDescriptor = FieldDescriptor {
    name: "Seller Rating",
    descriptor: Descriptor::Structural(Locator::XPath(".//div[1]/div/div/div[1]")),
};

pub const TOTAL_SALES: FieldDescriptor = FieldDescriptor {
    name: "Total Sales",
    descriptor: Descriptor::Structural(Locator::XPath(".//div[1]/div/div/div[2]")),
};

pub const SHIPPING_PRICE: FieldDescriptor = FieldDescriptor {
    name: "Shipping Price",
    descriptor: Descriptor::ContentMatch {
        scope: Locator::XPath(".//div"),
        pattern: "shipping",
    },
};
