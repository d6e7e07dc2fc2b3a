use crate::cache::IndexCache;
use crate::error::Result;
use crate::settings::cache_dir;

pub fn clear() -> Result<()> {
    let cache = IndexCache::new(cache_dir());
    let removed = cache.clear()?;
    println!("Removed {removed} cached index table(s) from {}", cache.dir().display());
    Ok(())
}
