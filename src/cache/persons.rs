use super::Cache;
use crate::error::{CacheError, CacheResult, EntityKind};
use crate::models::Person;
use crate::store::is_expired;

impl Cache {
    /// A person by account name, along with their recent posts.
    pub async fn person(&self, name: &str) -> CacheResult<Person> {
        if let Some(person) = self.persons.get(name) {
            if !is_expired(person.fetched_at, self.config.person_ttl) {
                log::debug!("person {} served from cache", name);
                return Ok(person);
            }
        }

        self.fetch_person(name).await?;

        self.persons
            .get(name)
            .ok_or_else(|| CacheError::not_found(EntityKind::Person, name))
    }

    /// Fetch a person and store each of their posts.
    ///
    /// A post that fails to normalize is skipped; a bio that fails to render
    /// fails the whole fetch.
    async fn fetch_person(&self, name: &str) -> CacheResult<()> {
        log::info!("fetching person: {}", name);

        let details = self.api.get_person(name).await?;
        let posts = self.store_listing(&details.posts);

        let person = self
            .normalizer
            .person(&details.person_view, posts.post_ids, posts.fetched_at)?;
        self.persons.set(name.to_string(), person);
        Ok(())
    }
}
