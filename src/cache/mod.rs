//! 对象缓存抽象
//!
//! 以插件方式注册缓存后端（moka 进程内 / redis），启动时按配置
//! 选择。缓存只用于令牌到用户的映射与量表目录这类可重建数据，
//! 评估记录的生命周期状态永远以存储层为准，不经过缓存。

pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 注册一个对象缓存插件，进程启动时经 ctor 自动执行
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $plugin:ident) => {
        ::paste::paste! {
            #[ctor::ctor]
            fn [<__register_object_cache_ $plugin:snake>]() {
                $crate::cache::register::register_object_cache_plugin(
                    $name,
                    ::std::sync::Arc::new(|| {
                        ::std::boxed::Box::pin(async {
                            match $plugin::new() {
                                Ok(cache) => ::std::result::Result::Ok(
                                    ::std::boxed::Box::new(cache)
                                        as ::std::boxed::Box<dyn $crate::cache::ObjectCache>,
                                ),
                                Err(e) => ::std::result::Result::Err(
                                    $crate::errors::EvalSystemError::cache_connection(e),
                                ),
                            }
                        })
                            as $crate::cache::register::BoxedObjectCacheFuture
                    }),
                );
            }
        }
    };
}
