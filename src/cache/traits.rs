use async_trait::async_trait;

/// 缓存查询结果
///
/// ExistsButNoValue 表示后端暂时不可用或取值失败，调用方应当
/// 回退到存储层而不是当作未命中写穿。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    ExistsButNoValue,
}

/// 字符串键值对象缓存，后端由插件注册表提供
#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;

    /// ttl 为秒；0 表示使用后端的默认 TTL
    async fn insert_raw(&self, key: String, value: String, ttl: u64);

    async fn remove(&self, key: &str);

    async fn invalidate_all(&self);
}
