//! # 权限门
//!
//! 对平台权限系统的薄封装：同步检查 + 异步请求。
//! 已授权时直接返回，不弹窗；未授权时等待平台结果，回调恰好触发一次。

use std::sync::Arc;

use super::platform::PermissionPlatform;

#[derive(Clone)]
pub struct PermissionGate {
    platform: Arc<dyn PermissionPlatform>,
}

impl PermissionGate {
    pub fn new(platform: Arc<dyn PermissionPlatform>) -> Self {
        Self { platform }
    }

    pub fn has_permission(&self) -> bool {
        self.platform.is_granted()
    }

    /// 请求权限；平台丢弃发送端按拒绝处理。
    pub async fn request(&self) -> bool {
        if self.has_permission() {
            return true;
        }

        log::info!("🔐 请求媒体读取权限");
        let granted = self.platform.prompt().await.unwrap_or(false);
        log::info!("🔐 权限请求结果：{}", if granted { "已授予" } else { "已拒绝" });
        granted
    }

    /// 回调形式的请求。
    ///
    /// 已授权时在当前线程同步回调；否则在后台等待平台结果后回调。
    pub fn request_with<F>(&self, on_result: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        if self.has_permission() {
            on_result(true);
            return;
        }

        let receiver = self.platform.prompt();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    on_result(receiver.await.unwrap_or(false));
                });
            }
            Err(_) => {
                std::thread::spawn(move || {
                    on_result(receiver.blocking_recv().unwrap_or(false));
                });
            }
        }
    }
}
