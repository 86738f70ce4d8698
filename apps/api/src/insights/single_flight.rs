//! Single-flight guard so only one request per industry calls the model.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

/// A short-lived, best-effort lock keyed by string.
///
/// Each acquisition is identified by a token; `release` only removes the lock
/// if it is still held under that token, so a holder that outlived the expiry
/// cannot free a lock someone else has since taken.
#[async_trait]
pub trait FlightGuard: Send + Sync {
    /// Returns the ownership token if the caller now holds `key`.
    async fn try_acquire(&self, key: &str) -> Result<Option<String>>;

    async fn release(&self, key: &str, token: &str) -> Result<()>;
}

pub fn insight_lock_key(industry: &str) -> String {
    format!("coach:insight-lock:{industry}")
}

/// Deletes KEYS[1] only while it still holds ARGV[1].
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Redis `SET NX EX` lock. The TTL bounds how long a crashed holder blocks others.
pub struct RedisFlightGuard {
    client: redis::Client,
    ttl_secs: u64,
    release_script: redis::Script,
}

impl RedisFlightGuard {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self {
            client,
            ttl_secs,
            release_script: redis::Script::new(RELEASE_SCRIPT),
        }
    }
}

fn acquire_cmd(key: &str, token: &str, ttl_secs: u64) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(token).arg("NX").arg("EX").arg(ttl_secs);
    cmd
}

#[async_trait]
impl FlightGuard for RedisFlightGuard {
    async fn try_acquire(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let token = Uuid::new_v4().to_string();
        let reply: Option<String> = acquire_cmd(key, &token, self.ttl_secs)
            .query_async(&mut conn)
            .await?;
        debug!("Lock {key} acquired={}", reply.is_some());
        Ok(reply.map(|_| token))
    }

    async fn release(&self, key: &str, token: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let deleted: i64 = self
            .release_script
            .key(key)
            .arg(token)
            .invoke_async(&mut conn)
            .await?;
        if deleted == 0 {
            warn!("Lock {key} expired before release; left to its current holder");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_support::LocalFlightGuard;

    #[test]
    fn test_lock_key_is_scoped_per_industry() {
        assert_eq!(insight_lock_key("Fintech"), "coach:insight-lock:Fintech");
        assert_ne!(insight_lock_key("Fintech"), insight_lock_key("Healthcare"));
    }

    #[test]
    fn test_acquire_stores_token_with_nx_and_expiry() {
        let packed = acquire_cmd("coach:insight-lock:Fintech", "tok-123", 120).get_packed_command();
        let packed = String::from_utf8(packed).unwrap();
        let args: Vec<&str> = packed
            .split("\r\n")
            .filter(|part| !part.is_empty() && !part.starts_with('*') && !part.starts_with('$'))
            .collect();
        assert_eq!(
            args,
            vec!["SET", "coach:insight-lock:Fintech", "tok-123", "NX", "EX", "120"]
        );
    }

    #[test]
    fn test_release_script_compares_before_deleting() {
        let get = RELEASE_SCRIPT.find("GET").unwrap();
        let del = RELEASE_SCRIPT.find("DEL").unwrap();
        assert!(get < del);
        assert!(RELEASE_SCRIPT.contains("== ARGV[1]"));
    }

    #[tokio::test]
    async fn test_stale_holder_cannot_release_new_holders_lock() {
        let guard = LocalFlightGuard::default();
        let key = insight_lock_key("Fintech");

        let first = guard.try_acquire(&key).await.unwrap().unwrap();
        assert!(guard.try_acquire(&key).await.unwrap().is_none());

        // The first holder's lock expires and a second request takes it over.
        guard.expire(&key);
        let second = guard.try_acquire(&key).await.unwrap().unwrap();
        assert_ne!(first, second);

        guard.release(&key, &first).await.unwrap();
        assert!(guard.is_held(&key), "stale release must not free the lock");
        assert!(guard.try_acquire(&key).await.unwrap().is_none());

        guard.release(&key, &second).await.unwrap();
        assert!(!guard.is_held(&key));
    }
}
