use reflex_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// Command velocity message for robot control
///
/// Emitted by both control loops: the braking loop sends a zero command while
/// braking, the avoidance loop sends its clamped steering command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmdVel {
    pub stamp_nanos: u64,
    pub linear: f32,  // m/s forward velocity
    pub angular: f32, // rad/s turning velocity
}

impl CmdVel {
    /// Create a new CmdVel message with current timestamp
    pub fn new(linear: f32, angular: f32) -> Self {
        Self::with_timestamp(linear, angular, reflex_core::timestamp_now())
    }

    /// Create a zero velocity command (stop)
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Create a CmdVel with explicit timestamp
    pub fn with_timestamp(linear: f32, angular: f32, stamp_nanos: u64) -> Self {
        Self {
            stamp_nanos,
            linear,
            angular,
        }
    }

    /// True when both components are exactly zero
    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

impl Default for CmdVel {
    fn default() -> Self {
        Self::zero()
    }
}

impl LogSummary for CmdVel {
    fn log_summary(&self) -> String {
        format!("CmdVel(lin={:.3}, ang={:.3})", self.linear, self.angular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cmd_vel_creation() {
        let cmd = CmdVel::new(0.5, -0.8);
        assert_relative_eq!(cmd.linear, 0.5);
        assert_relative_eq!(cmd.angular, -0.8);
        assert!(cmd.stamp_nanos > 0);
    }

    #[test]
    fn test_cmd_vel_zero() {
        let cmd = CmdVel::zero();
        assert_relative_eq!(cmd.linear, 0.0);
        assert_relative_eq!(cmd.angular, 0.0);
        assert!(cmd.is_zero());
    }

    #[test]
    fn test_cmd_vel_with_timestamp() {
        let cmd = CmdVel::with_timestamp(0.25, 0.1, 123456789);
        assert_eq!(cmd.stamp_nanos, 123456789);
        assert!(!cmd.is_zero());
        assert_eq!(cmd.log_summary(), "CmdVel(lin=0.250, ang=0.100)");
    }
}
