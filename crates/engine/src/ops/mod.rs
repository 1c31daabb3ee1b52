use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{LogNotifier, OtpNotifier, ResultEngine};

mod banners;
mod categories;
mod files;
mod ingredients;
mod recipes;
mod search;
mod sub_categories;
mod users;

pub use categories::CategoryPatch;
pub use search::{SearchQuery, SortField, SortOrder, Suggestions};
pub use sub_categories::SubCategoryPatch;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn OtpNotifier>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Option<Arc<dyn OtpNotifier>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Where password-reset codes go. Defaults to the log.
    pub fn notifier(mut self, notifier: Arc<dyn OtpNotifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(LogNotifier) as Arc<dyn OtpNotifier>),
        })
    }
}
