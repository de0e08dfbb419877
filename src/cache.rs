//! Our caching system remembers contexts between calls of the select command.
//!
//! To use the cache system, implement the Cacheable and CacheKey traits, then you can
//! use the read(), write() and read_all() functions.
//!
//! Everything lives under `$HOME/.cache/rusty-select/cache/v1/<type id>/`, one JSON file per
//! item.
use crate::context::{Context, ContextName};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

/// You need a cache key in order to read something for cache. Why not just use a string
/// as a cache key? Because then nothing stops you from reading a context out of the key of some
/// other type.
pub trait CacheKey {
    /// A file name inside the type's cache folder. Keys that can't be one are an error.
    fn as_path(&self) -> Result<String, crate::Error>;
}

/// Anything that can be cached needs to implement this trait.
///
/// Cacheable has an associated type so that we can always pair up a struct to be cached
/// with its cache key:
/// ```no_run
/// use rusty_select::cache::read;
/// use rusty_select::context::{Context, ContextName};
///
/// let context: Context = read(&ContextName::from("local"))?;
/// //           ^^^^^^^ -- since Context::CacheKey == ContextName, reading it with any other key
/// //                      type fails to compile.
/// # Ok::<(), rusty_select::Error>(())
/// ```
pub trait Cacheable {
    type CacheKey;

    fn cache_key(&self) -> Self::CacheKey;

    /// All items of the same type are saved in the same folder, named after this. Type ids should
    /// be unique.
    fn type_id() -> &'static str;
}

pub fn read<D, K>(cache_key: &K) -> Result<D, crate::Error>
where
    // So you can't do `let a: StructA = read(cache_key_that_is_used_for_StructB)`.
    D: Cacheable<CacheKey = K> + DeserializeOwned,
    K: CacheKey,
{
    read_from(&cache_root()?, cache_key)
}

pub fn write<D, K>(data: &D) -> Result<(), crate::Error>
where
    D: Cacheable<CacheKey = K> + Serialize,
    K: CacheKey,
{
    write_to(&cache_root()?, data)
}

/// Reads every cached item of a type, sorted by file name.
pub fn read_all<D>() -> Result<Vec<D>, crate::Error>
where
    D: Cacheable + DeserializeOwned,
{
    read_all_from(&cache_root()?)
}

fn read_from<D, K>(root: &Path, cache_key: &K) -> Result<D, crate::Error>
where
    D: Cacheable<CacheKey = K> + DeserializeOwned,
    K: CacheKey,
{
    let file_location = require_cache_folder(root, D::type_id())?.join(cache_key.as_path()?);

    read_file(&file_location)
}

fn write_to<D, K>(root: &Path, data: &D) -> Result<(), crate::Error>
where
    D: Cacheable<CacheKey = K> + Serialize,
    K: CacheKey,
{
    let file_location =
        require_cache_folder(root, D::type_id())?.join(data.cache_key().as_path()?);

    let data = serde_json::to_string(&data)?;

    fs::write(file_location, data)?;

    Ok(())
}

fn read_all_from<D>(root: &Path) -> Result<Vec<D>, crate::Error>
where
    D: Cacheable + DeserializeOwned,
{
    let folder = require_cache_folder(root, D::type_id())?;

    let mut files = fs::read_dir(folder)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    files.sort();

    files
        .into_iter()
        .filter(|path| path.extension().is_some_and(|extension| extension == "json"))
        .map(|path| read_file(&path))
        .collect()
}

fn read_file<D: DeserializeOwned>(path: &Path) -> Result<D, crate::Error> {
    let data = serde_json::from_reader(fs::File::open(path)?)?;

    Ok(data)
}

fn cache_root() -> Result<PathBuf, crate::Error> {
    let home = std::env::var("HOME")?;

    let mut path = PathBuf::from(home);
    path.push(".cache");
    path.push("rusty-select");
    path.push("cache");
    path.push("v1");

    Ok(path)
}

fn require_cache_folder(root: &Path, type_id: &'static str) -> Result<PathBuf, crate::Error> {
    let path = root.join(type_id);

    fs::create_dir_all(&path)?;

    Ok(path)
}

// Please dump all impls here, so we keep the rest of the code base clean.

impl Cacheable for Context {
    type CacheKey = ContextName;

    fn cache_key(&self) -> Self::CacheKey {
        self.name.clone()
    }

    fn type_id() -> &'static str {
        "context"
    }
}

impl CacheKey for ContextName {
    fn as_path(&self) -> Result<String, crate::Error> {
        // Context names come from the command line, they must not be able to leave the folder.
        let name = self.to_string();
        let is_plain_name = !name.is_empty() && !name.contains(['/', '\\', '\0']);

        if !is_plain_name {
            return Err(IoError::new(
                IoErrorKind::InvalidInput,
                format!("not a valid context name: {name:?}"),
            )
            .into());
        }

        Ok(format!("context_{name}.json"))
    }
}

/// The current context is a context name saved under a fixed key.
impl Cacheable for ContextName {
    type CacheKey = SharedCacheKey;

    fn cache_key(&self) -> Self::CacheKey {
        SharedCacheKey(Self::type_id().to_owned())
    }

    fn type_id() -> &'static str {
        "current_context"
    }
}

pub struct SharedCacheKey(String);

impl SharedCacheKey {
    pub fn of<D: Cacheable>() -> Self {
        SharedCacheKey(D::type_id().to_owned())
    }
}

impl CacheKey for SharedCacheKey {
    fn as_path(&self) -> Result<String, crate::Error> {
        Ok(self.0.clone())
    }
}
