use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_key: String,
    pub storage_url: String,
    pub owner_id: String,
    /// Random 128-bit hex token. Its unpredictability is the baseline
    /// security property for non-public files reachable by link.
    #[sea_orm(unique)]
    pub share_link: String,
    pub is_public: bool,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
    pub download_count: i64,
    pub max_downloads: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub qr_code: Option<String>,
    pub tags: Json,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// A file is expired iff an expiry is set and strictly in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }

    /// The limit is exceeded iff a ceiling is set and the counter reached it.
    pub fn is_download_limit_exceeded(&self) -> bool {
        match self.max_downloads {
            Some(max) => self.download_count >= max as i64,
            None => false,
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_file() -> Model {
        Model {
            id: "f1".to_string(),
            filename: "report.pdf".to_string(),
            original_name: "report.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 1024,
            storage_key: "files/u1/f1".to_string(),
            storage_url: "http://storage/files/u1/f1".to_string(),
            owner_id: "u1".to_string(),
            share_link: "a".repeat(32),
            is_public: false,
            password_hash: None,
            expires_at: None,
            download_count: 0,
            max_downloads: None,
            qr_code: None,
            tags: serde_json::json!([]),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn expiry_is_strict_past() {
        let now = Utc::now();
        let mut file = base_file();
        assert!(!file.is_expired(now));

        file.expires_at = Some(now - Duration::seconds(1));
        assert!(file.is_expired(now));

        // An expiry exactly at `now` is not yet expired
        file.expires_at = Some(now);
        assert!(!file.is_expired(now));

        file.expires_at = Some(now + Duration::hours(1));
        assert!(!file.is_expired(now));
    }

    #[test]
    fn download_limit_requires_ceiling() {
        let mut file = base_file();
        file.download_count = 1_000_000;
        assert!(!file.is_download_limit_exceeded());

        file.max_downloads = Some(3);
        file.download_count = 2;
        assert!(!file.is_download_limit_exceeded());
        file.download_count = 3;
        assert!(file.is_download_limit_exceeded());
    }

    #[test]
    fn tag_list_reads_json_array() {
        let mut file = base_file();
        file.tags = serde_json::json!(["work", "q3"]);
        assert_eq!(file.tag_list(), vec!["work".to_string(), "q3".to_string()]);
    }
}
