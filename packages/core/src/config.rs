/// How an updater passed to [`State::set`](crate::State::set) sees writes that have not been
/// flushed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "kebab-case"))]
pub enum UpdatePolicy {
    /// Updaters read the value committed by the last flush, and each write replaces the one
    /// before it. Three `|v| v + 1` calls in one tick produce `v + 1`.
    #[default]
    Overwrite,

    /// Updaters read the newest value, flushed or not, so they compose. Three `|v| v + 1` calls
    /// in one tick produce `v + 3`.
    Compose,
}

/// Runtime configuration shared by every state container created from one runtime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct Config {
    pub(crate) update_policy: UpdatePolicy,
    pub(crate) flush_budget: usize,
}

impl Config {
    pub const DEFAULT_FLUSH_BUDGET: usize = 1024;

    pub fn new() -> Self {
        Self {
            update_policy: UpdatePolicy::default(),
            flush_budget: Self::DEFAULT_FLUSH_BUDGET,
        }
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    /// Cap the number of follow-up flushes that writes made during a flush may chain.
    ///
    /// A subscriber that always writes a new value would otherwise keep the loop busy forever.
    pub fn with_flush_budget(mut self, budget: usize) -> Self {
        self.flush_budget = budget;
        self
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    pub fn flush_budget(&self) -> usize {
        self.flush_budget
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
