use burrow_core::ShortenerRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ShortenResponse {
    pub result: String,
}

/// One entry of the `GET /api/user/urls` listing.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

impl From<ShortenerRecord> for UserUrl {
    fn from(record: ShortenerRecord) -> Self {
        Self {
            short_url: record.short_url,
            original_url: record.original_url,
        }
    }
}
