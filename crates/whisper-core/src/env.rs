//! Environment abstraction for deterministic testing.
//!
//! Decouples the session state machines from system resources (time,
//! randomness). The typing-debounce clock and object-name generation both go
//! through this trait, so tests can drive them with virtual time and seeded
//! randomness while production uses real system resources.

use std::time::Duration;

/// Abstract environment providing time, randomness, and async sleep.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `random_bytes()` uses cryptographically secure entropy in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; test environments
    /// may use virtual time.
    type Instant: Copy + Ord + Send + Sync + std::fmt::Debug + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be
    /// used by driver code (not state-machine logic).
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Seconds since the Unix epoch.
    ///
    /// Wall-clock time for user-facing records (presence timestamps).
    /// Monotonic ordering is NOT guaranteed across calls.
    fn wall_clock_secs(&self) -> u64;

    /// Generates a random `u128`.
    ///
    /// Convenience for collision-resistant object names.
    fn random_u128(&self) -> u128 {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }
}

/// Production environment using system time and cryptographic RNG.
///
/// Uses `std::time::Instant::now()` for time, `tokio::time::sleep()` for
/// async sleeping, and getrandom for cryptographic randomness.
///
/// # Panics
///
/// Panics if the OS RNG fails. This is intentional - a client without
/// functioning randomness cannot generate collision-resistant object names,
/// and RNG failure indicates OS-level breakage.
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - cannot generate object names");
    }

    #[allow(clippy::expect_used)]
    fn wall_clock_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("invariant: system clock is after Unix epoch (1970-01-01)")
            .as_secs()
    }
}

/// Virtual instant used by [`SimEnv`], counted in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimInstant(u64);

impl std::ops::Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug)]
struct SimState {
    now_ms: u64,
    rng: u64,
}

/// Deterministic environment for tests: virtual clock, seeded RNG.
///
/// Time only advances when the test calls [`SimEnv::advance`] (or awaits
/// [`Environment::sleep`], which advances virtually instead of waiting).
#[derive(Debug, Clone)]
pub struct SimEnv {
    state: std::sync::Arc<std::sync::Mutex<SimState>>,
}

impl SimEnv {
    /// Create an environment with the given RNG seed at virtual time zero.
    pub fn with_seed(seed: u64) -> Self {
        let state = SimState { now_ms: 0, rng: seed | 1 };
        Self { state: std::sync::Arc::new(std::sync::Mutex::new(state)) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.lock();
        state.now_ms = state.now_ms.saturating_add(duration.as_millis() as u64);
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> Self::Instant {
        SimInstant(self.lock().now_ms)
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        let mut state = self.lock();
        for byte in buffer.iter_mut() {
            // xorshift64: reproducible, obviously not cryptographic
            state.rng ^= state.rng << 13;
            state.rng ^= state.rng >> 7;
            state.rng ^= state.rng << 17;
            *byte = (state.rng & 0xFF) as u8;
        }
    }

    fn wall_clock_secs(&self) -> u64 {
        self.lock().now_ms / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1, "Time should advance");
    }

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn random_u128_draws_fresh_values() {
        let env = SystemEnv::new();
        assert_ne!(env.random_u128(), env.random_u128());
    }

    #[test]
    fn sim_env_is_deterministic() {
        let a = SimEnv::with_seed(7);
        let b = SimEnv::with_seed(7);
        assert_eq!(a.random_u128(), b.random_u128());
        assert_eq!(a.random_u128(), b.random_u128());
    }

    #[test]
    fn sim_env_clock_only_moves_on_advance() {
        let env = SimEnv::with_seed(1);
        let t1 = env.now();
        let t2 = env.now();
        assert_eq!(t1, t2);

        env.advance(Duration::from_millis(250));
        let t3 = env.now();
        assert_eq!(t3 - t1, Duration::from_millis(250));
    }
}
