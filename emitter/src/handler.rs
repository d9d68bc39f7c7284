//! 事件处理器（Handler / Listener）
//!
//! `Handler<T>` 是注册到发射器上的可调用体，内部以 `Arc` 持有，克隆代价极低。
//! 移除监听器时按**身份**比较：只有同一个 `Handler`（或其克隆）才算相同，
//! 行为一致但分别构造的两个处理器互不相等。
//!
use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

/// 处理器返回的 future；成功值被丢弃，失败交由诊断上报
pub type HandlerFuture = BoxFuture<'static, anyhow::Result<()>>;

type HandlerFn<T> = dyn Fn(T) -> HandlerFuture + Send + Sync;

const ANONYMOUS: &str = "anonymous";

/// 结构化监听器：带名称、以 trait 对象形式注册
#[async_trait]
pub trait Listener<T: Send + 'static>: Send + Sync {
    /// 监听器名称（用于失败上报）
    fn listener_name(&self) -> &str;
    /// 处理一次发射的值
    async fn handle(&self, value: T) -> anyhow::Result<()>;
}

pub struct Handler<T> {
    f: Arc<HandlerFn<T>>,
    name: Arc<str>,
}

impl<T: Send + 'static> Handler<T> {
    /// 由异步闭包构造
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |value: T| f(value).boxed()),
            name: Arc::from(ANONYMOUS),
        }
    }

    /// 由同步闭包构造，闭包在处理器被调用时立即执行
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(move |value: T| future::ready(f(value)).boxed()),
            name: Arc::from(ANONYMOUS),
        }
    }

    /// 由结构化监听器构造，名称取自 `listener_name`
    pub fn from_listener<L>(listener: Arc<L>) -> Self
    where
        L: Listener<T> + 'static,
    {
        let name = Arc::from(listener.listener_name());
        Self {
            f: Arc::new(move |value: T| {
                let listener = listener.clone();
                async move { listener.handle(value).await }.boxed()
            }),
            name,
        }
    }
}

impl<T> Handler<T> {
    /// 设置用于上报的名称；不改变身份
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Arc::from(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 身份比较：是否为同一个底层可调用体
    pub fn same_as(&self, other: &Handler<T>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.f), Arc::as_ptr(&other.f))
    }

    pub(crate) fn call(&self, value: T) -> HandlerFuture {
        (self.f)(value)
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            name: self.name.clone(),
        }
    }
}

impl<T> PartialEq for Handler<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl<T> Eq for Handler<T> {}

impl<T> Debug for Handler<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("ptr", &Arc::as_ptr(&self.f).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn clones_share_identity_but_twins_do_not() {
        let h1 = Handler::<i32>::from_fn(|_| Ok(()));
        let h1_clone = h1.clone();
        let twin = Handler::<i32>::from_fn(|_| Ok(()));

        assert!(h1.same_as(&h1_clone));
        assert_eq!(h1, h1_clone);
        assert_ne!(h1, twin);
    }

    #[test]
    fn naming_keeps_identity() {
        let h = Handler::<i32>::from_fn(|_| Ok(()));
        let named = h.clone().named("persist");

        assert_eq!(h.name(), "anonymous");
        assert_eq!(named.name(), "persist");
        assert!(named.same_as(&h));
    }

    #[test]
    fn from_fn_runs_body_at_call_time() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let h = {
            let seen = seen.clone();
            Handler::from_fn(move |v: i32| {
                seen.lock().unwrap().push(v);
                Ok(())
            })
        };

        let fut = h.call(7);
        assert_eq!(*seen.lock().unwrap(), vec![7]);
        drop(fut);
    }

    struct Audit;

    #[async_trait]
    impl Listener<String> for Audit {
        fn listener_name(&self) -> &str {
            "audit"
        }

        async fn handle(&self, value: String) -> anyhow::Result<()> {
            anyhow::ensure!(!value.is_empty(), "empty value");
            Ok(())
        }
    }

    #[tokio::test]
    async fn from_listener_takes_name_and_forwards_value() {
        let h = Handler::from_listener(Arc::new(Audit));

        assert_eq!(h.name(), "audit");
        assert!(h.call("x".to_string()).await.is_ok());
        assert!(h.call(String::new()).await.is_err());
    }
}
