//! Pool configuration
//!
//! Pools are organized in groups; each group is a failover list with a
//! quota. Most firmwares only know a single group of three pools, so their
//! encoders use the first group and pad it.

use serde::Serialize;
use serde_json::{Value, json};

use crate::fragment::{Fragment, as_u32, lookup};
use crate::traits::aspect::or_default;
use crate::traits::{ConfigAspect, ConfigValue};
use crate::vendor::Vendor;

/// Slots in the single-group firmwares
const POOL_SLOTS: usize = 3;

/// A single stratum endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pool {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl Pool {
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Read one entry; `url` must be a string, the rest default to empty
    fn from_keys(entry: &Value, url: &str, user: &str, password: &str) -> Option<Self> {
        let url = entry.get(url)?.as_str()?;
        let text = |key: &str| entry.get(key).and_then(Value::as_str).unwrap_or_default();
        Some(Self::new(url, text(user), text(password)))
    }

    fn worker(&self, user_suffix: Option<&str>) -> String {
        match user_suffix {
            Some(suffix) => format!("{}{}", self.user, suffix),
            None => self.user.clone(),
        }
    }

    fn as_url_user_pass(&self, user_suffix: Option<&str>) -> Value {
        json!({"url": self.url, "user": self.worker(user_suffix), "pass": self.password})
    }

    fn as_bosminer(&self, user_suffix: Option<&str>) -> Value {
        json!({"url": self.url, "user": self.worker(user_suffix), "password": self.password})
    }

    fn as_epic(&self, user_suffix: Option<&str>) -> Value {
        json!({"pool": self.url, "login": self.worker(user_suffix), "password": self.password})
    }

    fn as_avalon(&self, user_suffix: Option<&str>) -> String {
        format!("{},{},{}", self.url, self.worker(user_suffix), self.password)
    }
}

/// Failover list of pools sharing a quota
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolGroup {
    pub pools: Vec<Pool>,
    pub quota: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for PoolGroup {
    fn default() -> Self {
        Self {
            pools: Vec::new(),
            quota: Self::DEFAULT_QUOTA,
            name: None,
        }
    }
}

impl PoolGroup {
    pub const DEFAULT_QUOTA: u32 = 1;

    pub fn new(pools: Vec<Pool>) -> Self {
        Self {
            pools,
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_quota(mut self, quota: u32) -> Self {
        self.quota = quota;
        self
    }

    fn from_canonical(conf: &Value) -> Option<Self> {
        let pools = conf
            .get("pools")?
            .as_array()?
            .iter()
            .filter_map(|pool| Pool::from_keys(pool, "url", "user", "password"))
            .collect();
        Some(Self {
            pools,
            quota: conf.get("quota").and_then(as_u32).unwrap_or(Self::DEFAULT_QUOTA),
            name: conf.get("name").and_then(Value::as_str).map(str::to_string),
        })
    }

    fn from_bosminer(conf: &Value) -> Option<Self> {
        Self::from_canonical(&json!({
            "pools": conf.get("pool")?,
            "quota": conf.get("quota"),
            "name": conf.get("name"),
        }))
    }

    /// First [`POOL_SLOTS`] pools, padded with empty ones
    fn slots(&self) -> Vec<Pool> {
        let mut slots: Vec<Pool> = self.pools.iter().take(POOL_SLOTS).cloned().collect();
        slots.resize_with(POOL_SLOTS, Pool::default);
        slots
    }

    fn as_numbered(
        &self,
        user_suffix: Option<&str>,
        keys: impl Fn(usize) -> [String; 3],
    ) -> Fragment {
        let mut frag = Fragment::new();
        for (idx, pool) in self.slots().iter().enumerate() {
            let [url, user, password] = keys(idx + 1);
            frag.insert(url, json!(pool.url));
            let worker = if pool.url.is_empty() {
                String::new()
            } else {
                pool.worker(user_suffix)
            };
            frag.insert(user, json!(worker));
            frag.insert(password, json!(pool.password));
        }
        frag
    }

    fn as_bosminer(&self, idx: usize, user_suffix: Option<&str>) -> Value {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("group_{idx}"));
        let pools: Vec<Value> = self.pools.iter().map(|p| p.as_bosminer(user_suffix)).collect();
        json!({"name": name, "quota": self.quota, "pool": pools})
    }
}

/// Pool configuration aspect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolConfig {
    pub groups: Vec<PoolGroup>,
}

impl PoolConfig {
    pub fn new(groups: Vec<PoolGroup>) -> Self {
        Self { groups }
    }

    /// A single group holding `pools`
    pub fn simple(pools: Vec<Pool>) -> Self {
        Self::new(vec![PoolGroup::new(pools)])
    }

    /// Canonical decode; malformed groups and pools are skipped
    pub fn from_canonical(conf: Option<&Value>) -> Self {
        let groups = conf
            .and_then(|conf| conf.get("groups"))
            .and_then(Value::as_array)
            .map(|groups| groups.iter().filter_map(PoolGroup::from_canonical).collect())
            .unwrap_or_default();
        Self { groups }
    }

    /// cgminer API `pools` response
    pub fn from_api(raw: &Value) -> Self {
        let decoded = raw.get("POOLS").and_then(Value::as_array).map(|pools| {
            let pools = pools
                .iter()
                .filter_map(|pool| {
                    let mut pool = Pool::from_keys(pool, "URL", "User", "")?;
                    pool.password = "x".to_string();
                    Some(pool)
                })
                .collect();
            Self::simple(pools)
        });
        or_default(decoded, Vendor::Api)
    }

    /// Antminer web UI: `pools[].url/user/pass`
    pub fn from_am_modern(raw: &Value) -> Self {
        or_default(Self::parse_url_user_pass(raw.get("pools")), Vendor::AntminerModern)
    }

    /// Legacy Antminer web UI, same layout as the modern one
    pub fn from_am_old(raw: &Value) -> Self {
        or_default(Self::parse_url_user_pass(raw.get("pools")), Vendor::AntminerOld)
    }

    /// Goldshell web UI, same layout as Antminer
    pub fn from_goldshell(raw: &Value) -> Self {
        or_default(Self::parse_url_user_pass(raw.get("pools")), Vendor::Goldshell)
    }

    /// Innosilicon: the payload is the pool list itself
    pub fn from_inno(raw: &Value) -> Self {
        or_default(Self::parse_url_user_pass(Some(raw)), Vendor::Innosilicon)
    }

    /// BOSminer TOML: `group[]` tables with nested `pool[]`
    pub fn from_bosminer(raw: &Value) -> Self {
        let decoded = raw.get("group").and_then(Value::as_array).map(|groups| {
            Self::new(groups.iter().filter_map(PoolGroup::from_bosminer).collect())
        });
        or_default(decoded, Vendor::BosMiner)
    }

    /// ePIC summary: `StratumConfigs[]`
    pub fn from_epic(raw: &Value) -> Self {
        let decoded = lookup(raw, &["StratumConfigs"])
            .and_then(Value::as_array)
            .map(|pools| {
                Self::simple(
                    pools
                        .iter()
                        .filter_map(|pool| Pool::from_keys(pool, "pool", "login", "password"))
                        .collect(),
                )
            });
        or_default(decoded, Vendor::Epic)
    }

    /// Slot-based layouts; empty-URL slots are padding and are dropped
    fn parse_url_user_pass(pools: Option<&Value>) -> Option<Self> {
        let pools = pools?.as_array()?;
        Some(Self::simple(
            pools
                .iter()
                .filter_map(|pool| Pool::from_keys(pool, "url", "user", "pass"))
                .filter(|pool| !pool.url.is_empty())
                .collect(),
        ))
    }

    fn first_group(&self) -> PoolGroup {
        self.groups.first().cloned().unwrap_or_default()
    }

    /// Render for `vendor`, appending `user_suffix` to every worker name
    pub fn encode_with_suffix(&self, vendor: Vendor, user_suffix: Option<&str>) -> Fragment {
        let group = self.first_group();
        match vendor {
            Vendor::AntminerModern | Vendor::Goldshell => {
                let pools: Vec<Value> = group
                    .slots()
                    .iter()
                    .map(|pool| {
                        if pool.url.is_empty() {
                            pool.as_url_user_pass(None)
                        } else {
                            pool.as_url_user_pass(user_suffix)
                        }
                    })
                    .collect();
                let mut frag = Fragment::new();
                frag.insert("pools".to_string(), Value::Array(pools));
                frag
            }
            Vendor::AntminerOld => group.as_numbered(user_suffix, |i| {
                [
                    format!("_ant_pool{i}url"),
                    format!("_ant_pool{i}user"),
                    format!("_ant_pool{i}pw"),
                ]
            }),
            Vendor::Whatsminer => group.as_numbered(user_suffix, |i| {
                [format!("pool_{i}"), format!("worker_{i}"), format!("passwd_{i}")]
            }),
            Vendor::Innosilicon => group.as_numbered(user_suffix, |i| {
                [format!("Pool{i}"), format!("UserName{i}"), format!("Password{i}")]
            }),
            Vendor::Avalon => {
                let first = group.pools.first().cloned().unwrap_or_default();
                let mut frag = Fragment::new();
                frag.insert("pools".to_string(), json!(first.as_avalon(user_suffix)));
                frag
            }
            Vendor::BosMiner => {
                let groups: Vec<Value> = self
                    .groups
                    .iter()
                    .enumerate()
                    .map(|(idx, group)| group.as_bosminer(idx, user_suffix))
                    .collect();
                let mut frag = Fragment::new();
                frag.insert("group".to_string(), Value::Array(groups));
                frag
            }
            Vendor::Epic => {
                let stratum: Vec<Value> =
                    group.pools.iter().map(|p| p.as_epic(user_suffix)).collect();
                let mut frag = Fragment::new();
                frag.insert(
                    "pools".to_string(),
                    json!({"coin": "Btc", "stratum_configs": stratum, "unique_id": false}),
                );
                frag
            }
            Vendor::Api | Vendor::BosGrpc => Fragment::new(),
        }
    }
}

impl ConfigValue for PoolConfig {
    fn encode(&self, vendor: Vendor) -> Fragment {
        self.encode_with_suffix(vendor, None)
    }
}

impl ConfigAspect for PoolConfig {
    const NAME: &'static str = "pools";

    fn decode(vendor: Vendor, raw: &Value) -> Self {
        match vendor {
            Vendor::Api => Self::from_api(raw),
            Vendor::AntminerModern => Self::from_am_modern(raw),
            Vendor::AntminerOld => Self::from_am_old(raw),
            Vendor::Goldshell => Self::from_goldshell(raw),
            Vendor::Innosilicon => Self::from_inno(raw),
            Vendor::BosMiner => Self::from_bosminer(raw),
            Vendor::Epic => Self::from_epic(raw),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pools() -> PoolConfig {
        PoolConfig::simple(vec![
            Pool::new("stratum+tcp://a.example:3333", "acct", "x"),
            Pool::new("stratum+tcp://b.example:3333", "acct", "x"),
        ])
    }

    #[test]
    fn test_canonical_round_trip() {
        let config = PoolConfig::new(vec![
            PoolGroup::new(vec![Pool::new("stratum+tcp://a.example:3333", "acct", "x")])
                .named("main")
                .with_quota(3),
            PoolGroup::new(vec![Pool::new("stratum+tcp://b.example:3333", "acct", "")]),
        ]);
        let encoded = serde_json::to_value(&config).unwrap();
        assert_eq!(encoded["groups"][0]["name"], json!("main"));
        assert!(encoded["groups"][1].get("name").is_none());
        assert_eq!(PoolConfig::from_canonical(Some(&encoded)), config);
    }

    #[test]
    fn test_canonical_skips_malformed() {
        let conf = json!({"groups": [
            {"pools": [{"url": "stratum+tcp://a.example:3333", "user": "acct"}, {"user": "nourl"}]},
            {"quota": 2},
            "junk"
        ]});
        let decoded = PoolConfig::from_canonical(Some(&conf));
        assert_eq!(
            decoded,
            PoolConfig::simple(vec![Pool::new("stratum+tcp://a.example:3333", "acct", "")])
        );
        assert_eq!(PoolConfig::from_canonical(None), PoolConfig::default());
    }

    #[test]
    fn test_canonical_keeps_empty_url() {
        let config = PoolConfig::simple(vec![
            Pool::new("", "", ""),
            Pool::new("stratum+tcp://a.example:1", "acct", "x"),
        ]);
        let encoded = serde_json::to_value(&config).unwrap();
        assert_eq!(PoolConfig::from_canonical(Some(&encoded)), config);
    }

    #[test]
    fn test_slot_decoders_drop_empty_url() {
        let raw = json!({"pools": [
            {"url": "", "user": "", "pass": ""},
            {"url": "stratum+tcp://a.example:1", "user": "acct", "pass": "x"}
        ]});
        let expected = PoolConfig::simple(vec![Pool::new("stratum+tcp://a.example:1", "acct", "x")]);
        assert_eq!(PoolConfig::from_am_modern(&raw), expected);
        assert_eq!(PoolConfig::from_am_old(&raw), expected);
        assert_eq!(PoolConfig::from_goldshell(&raw), expected);
    }

    #[test]
    fn test_am_modern_pads_and_suffixes() {
        let frag = two_pools().encode_with_suffix(Vendor::AntminerModern, Some(".rig1"));
        assert_eq!(
            Value::Object(frag),
            json!({"pools": [
                {"url": "stratum+tcp://a.example:3333", "user": "acct.rig1", "pass": "x"},
                {"url": "stratum+tcp://b.example:3333", "user": "acct.rig1", "pass": "x"},
                {"url": "", "user": "", "pass": ""}
            ]})
        );
    }

    #[test]
    fn test_am_modern_round_trip_drops_padding() {
        let frag = Value::Object(two_pools().encode(Vendor::AntminerModern));
        assert_eq!(PoolConfig::from_am_modern(&frag), two_pools());
    }

    #[test]
    fn test_numbered_encoders() {
        let frag = two_pools().encode_with_suffix(Vendor::AntminerOld, Some("_w"));
        assert_eq!(frag["_ant_pool1url"], json!("stratum+tcp://a.example:3333"));
        assert_eq!(frag["_ant_pool2user"], json!("acct_w"));
        assert_eq!(frag["_ant_pool3user"], json!(""));
        assert_eq!(frag.len(), 9);

        let frag = two_pools().encode(Vendor::Whatsminer);
        assert_eq!(frag["pool_1"], json!("stratum+tcp://a.example:3333"));
        assert_eq!(frag["worker_2"], json!("acct"));
        assert_eq!(frag["passwd_3"], json!(""));

        let frag = two_pools().encode(Vendor::Innosilicon);
        assert_eq!(frag["Pool2"], json!("stratum+tcp://b.example:3333"));
        assert_eq!(frag["UserName1"], json!("acct"));
        assert_eq!(frag["Password1"], json!("x"));
    }

    #[test]
    fn test_avalon_first_pool() {
        assert_eq!(
            Value::Object(two_pools().encode_with_suffix(Vendor::Avalon, Some(".a"))),
            json!({"pools": "stratum+tcp://a.example:3333,acct.a,x"})
        );
    }

    #[test]
    fn test_bosminer_round_trip() {
        let config = PoolConfig::new(vec![
            PoolGroup::new(vec![Pool::new("stratum+tcp://a.example:3333", "acct", "x")])
                .named("main")
                .with_quota(2),
        ]);
        let frag = Value::Object(config.encode(Vendor::BosMiner));
        assert_eq!(
            frag,
            json!({"group": [{
                "name": "main",
                "quota": 2,
                "pool": [{"url": "stratum+tcp://a.example:3333", "user": "acct", "password": "x"}]
            }]})
        );
        assert_eq!(PoolConfig::from_bosminer(&frag), config);
    }

    #[test]
    fn test_bosminer_unnamed_group() {
        let frag = two_pools().encode(Vendor::BosMiner);
        assert_eq!(frag["group"][0]["name"], json!("group_0"));
        assert_eq!(frag["group"][0]["quota"], json!(1));
    }

    #[test]
    fn test_epic_encode_and_decode() {
        let frag = two_pools().encode_with_suffix(Vendor::Epic, Some(".e"));
        assert_eq!(frag["pools"]["coin"], json!("Btc"));
        assert_eq!(frag["pools"]["unique_id"], json!(false));
        assert_eq!(frag["pools"]["stratum_configs"][1]["login"], json!("acct.e"));

        let summary = json!({"StratumConfigs": [
            {"pool": "stratum+tcp://a.example:3333", "login": "acct", "password": "x"}
        ]});
        assert_eq!(
            PoolConfig::from_epic(&summary),
            PoolConfig::simple(vec![Pool::new("stratum+tcp://a.example:3333", "acct", "x")])
        );
    }

    #[test]
    fn test_api_and_inno_decode() {
        let api = json!({"POOLS": [{"URL": "stratum+tcp://a.example:3333", "User": "acct", "Status": "Alive"}]});
        assert_eq!(
            PoolConfig::from_api(&api),
            PoolConfig::simple(vec![Pool::new("stratum+tcp://a.example:3333", "acct", "x")])
        );

        let inno = json!([{"url": "stratum+tcp://a.example:3333", "user": "acct", "pass": "p"}]);
        assert_eq!(
            PoolConfig::from_inno(&inno),
            PoolConfig::simple(vec![Pool::new("stratum+tcp://a.example:3333", "acct", "p")])
        );
    }

    #[test]
    fn test_missing_pools_is_default() {
        assert_eq!(PoolConfig::from_am_modern(&json!({})), PoolConfig::default());
        assert_eq!(PoolConfig::from_bosminer(&json!({"group": 3})), PoolConfig::default());
        assert!(PoolConfig::default().encode(Vendor::BosGrpc).is_empty());
    }
}
