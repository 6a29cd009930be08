/// Read-through caching around an async block that yields an `AppResult`.
///
/// Looks `$key` up first. A hit is returned as-is. On a miss the block runs and
/// its value is queued for a background write with `$ttl` seconds to live.
///
/// A failed cache read is logged and treated as a miss, so an unavailable
/// Redis degrades to uncached lookups instead of failing them. Errors from the
/// block itself propagate with `?`.
///
/// # Example
/// ```rust,ignore
/// let recipes = cached!(self.cache, CacheKey::RecipeSearch { .. }, ttl, async move {
///     fetch_from_upstream().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            other => {
                if let Err(e) = other {
                    tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
