use chrono::Utc;

use super::Cache;
use crate::error::{CacheError, CacheResult, EntityKind};
use crate::models::{Community, Page, Paging, SortType};
use crate::store::{PageKey, is_expired};
use crate::upstream::PostView;

impl Cache {
    /// A page of the home feed.
    ///
    /// Posts on a freshly fetched page are stored individually; their comments
    /// are not fetched.
    pub async fn home(&self, page: u32, sort: SortType) -> CacheResult<Page> {
        let key = PageKey::new(page, sort);
        if let Some(home) = self.home.get(&key) {
            if !is_expired(home.fetched_at, self.config.page_ttl) {
                log::debug!("home page {} served from cache", key);
                return Ok(home);
            }
        }

        self.fetch_home(key).await?;

        self.home
            .get(&key)
            .ok_or_else(|| CacheError::not_found(EntityKind::HomePage, key))
    }

    pub(super) async fn fetch_home(&self, key: PageKey) -> CacheResult<()> {
        log::info!("fetching home posts page: {}", key);

        let paging = Paging::new(key.page, self.config.page_size);
        let views = self.api.list_posts(None, paging, key.sort).await?;

        let page = self.store_listing(&views);
        self.home.set(key, page);
        Ok(())
    }

    /// A page of posts within one community.
    ///
    /// An unknown community triggers one refresh of the community set; if it
    /// is still unknown afterwards the result is `NotFound`, whatever the
    /// refresh itself reported.
    pub async fn community_posts(
        &self,
        community_name: &str,
        page: u32,
        sort: SortType,
    ) -> CacheResult<Page> {
        let community = match self.communities.get(community_name) {
            Some(community) => community,
            None => {
                if let Err(err) = self.fetch_communities().await {
                    log::error!("failed refreshing communities: {}", err);
                }
                self.communities.get(community_name).ok_or_else(|| {
                    CacheError::not_found(EntityKind::Community, community_name)
                })?
            }
        };

        let key = PageKey::new(page, sort);
        if let Some(cached) = community.pages.get(&key) {
            if !is_expired(cached.fetched_at, self.config.page_ttl) {
                log::debug!("{} page {} served from cache", community.name, key);
                return Ok(cached);
            }
        }

        self.fetch_community_posts(&community, key).await?;

        community.pages.get(&key).ok_or_else(|| {
            CacheError::not_found(
                EntityKind::CommunityPage,
                format!("{}/{}", community.name, key),
            )
        })
    }

    async fn fetch_community_posts(&self, community: &Community, key: PageKey) -> CacheResult<()> {
        log::info!("fetching {} posts page: {}", community.name, key);

        let paging = Paging::new(key.page, self.config.page_size);
        let views = self
            .api
            .list_posts(Some(community.id), paging, key.sort)
            .await?;

        let page = self.store_listing(&views);
        community.pages.set(key, page);
        Ok(())
    }

    /// Store every post of a listing and build the page of their IDs.
    ///
    /// A post that fails to normalize is logged and left off the page; the
    /// rest of the listing is unaffected.
    pub(super) fn store_listing(&self, views: &[PostView]) -> Page {
        let fetched_at = Utc::now();
        let mut post_ids = Vec::with_capacity(views.len());

        for view in views {
            match self.store_post(view) {
                Ok(id) => post_ids.push(id),
                Err(err) => {
                    log::error!("failed to add post {}: {}", view.post.id, err);
                    self.record_skip();
                }
            }
        }

        Page {
            post_ids,
            fetched_at,
        }
    }
}
