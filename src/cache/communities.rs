use chrono::Utc;
use std::sync::Arc;

use super::Cache;
use crate::error::{CacheError, CacheResult, EntityKind};
use crate::models::{Community, Paging};

impl Cache {
    /// A community by name.
    ///
    /// Community metadata does not expire. An unknown name refreshes the
    /// whole community set once.
    pub async fn community(&self, name: &str) -> CacheResult<Community> {
        if let Some(community) = self.communities.get(name) {
            return Ok(community);
        }

        let refreshed = self.fetch_communities().await;
        match self.communities.get(name) {
            Some(community) => Ok(community),
            None => {
                refreshed?;
                Err(CacheError::not_found(EntityKind::Community, name))
            }
        }
    }

    /// Every known community, ordered by name.
    ///
    /// Fetches the community set only when nothing is stored yet.
    pub async fn communities(&self) -> CacheResult<Vec<Community>> {
        if self.communities.is_empty() {
            self.fetch_communities().await?;
        }

        let mut communities = self.communities.values();
        communities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(communities)
    }

    /// Fetch every local community, paging until a short page comes back.
    ///
    /// Nothing is stored unless every page arrives. Communities already stored
    /// keep their page store.
    pub(super) async fn fetch_communities(&self) -> CacheResult<()> {
        log::info!("fetching communities");

        let mut views = Vec::new();
        let mut paging = Paging::new(1, self.config.page_size);
        loop {
            let page = self.api.list_communities(paging).await?;
            let short = page.len() < paging.limit as usize;
            views.extend(page);

            if short {
                break;
            }
            paging = paging.next();
        }

        let fetched_at = Utc::now();
        for view in views {
            let record = view.community;
            let pages = self
                .communities
                .get(&record.name)
                .map(|existing| Arc::clone(&existing.pages))
                .unwrap_or_default();

            self.communities.set(
                record.name.clone(),
                Community {
                    id: record.id,
                    name: record.name,
                    title: record.title,
                    description: record.description.unwrap_or_default(),
                    fetched_at,
                    pages,
                },
            );
        }

        Ok(())
    }
}
