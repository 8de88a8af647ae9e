//! # Simulated arm
//!
//! Stands in for the arm mechanisms. Joint demands are tracked at a limited rate and the end
//! effector position is measured with the forward model.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

// Internal
use crate::dh_chain::ChainError;
use crate::fwd_kin::ForwardKinematics;
use comms_if::eqpt::mech::{ActId, MechDems, MechSensData};
use util::maths::{ang_dist, clamp, wrap_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated arm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimArmParams {
    /// Period between measurements.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Maximum rate of every joint.
    ///
    /// Units: radians/second
    pub max_rate_rads: f64,
}

/// A simulated arm.
pub struct SimArm {
    params: SimArmParams,

    fk: ForwardKinematics,

    /// Current joint positions, base to tip.
    pos_rad: [f64; 3],

    /// Last received demands.
    dems: Option<MechDems>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors from the simulated arm.
#[derive(Debug, Error)]
pub enum SimArmError {
    #[error("Could not build the forward model: {0}")]
    ForwardModel(#[from] ChainError),

    #[error("Demands do not contain a position for every arm joint")]
    IncompleteDems,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimArmParams {
    fn default() -> Self {
        Self {
            period_s: 0.05,
            max_rate_rads: 1.0,
        }
    }
}

impl SimArm {
    /// Create a new simulated arm with all joints at zero.
    pub fn new(params: SimArmParams) -> Result<Self, SimArmError> {
        Ok(Self {
            params,
            fk: ForwardKinematics::new()?,
            pos_rad: [0.0; 3],
            dems: None,
        })
    }

    /// Set new joint demands.
    pub fn set_dems(&mut self, dems: MechDems) -> Result<(), SimArmError> {
        if dems.joints().is_none() {
            return Err(SimArmError::IncompleteDems);
        }
        self.dems = Some(dems);
        Ok(())
    }

    /// Advance the simulation by `dt_s` seconds and return the measurement.
    pub fn step(&mut self, dt_s: f64) -> Result<MechSensData, SimArmError> {
        if let Some((d1, d2, d3)) = self.dems.as_ref().and_then(|d| d.joints()) {
            let max_step_rad = self.params.max_rate_rads * dt_s;

            for (i, (pos, dem)) in self.pos_rad.iter_mut().zip([d1, d2, d3].iter()).enumerate() {
                // The base joint takes the short way round, the others are bounded
                let err = match i {
                    0 => ang_dist(*pos, *dem),
                    _ => dem - *pos,
                };
                *pos += clamp(&err, &-max_step_rad, &max_step_rad);
            }
            self.pos_rad[0] = wrap_pi(self.pos_rad[0]);
        }

        self.measure()
    }

    /// Measure the joint and end effector positions.
    pub fn measure(&self) -> Result<MechSensData, SimArmError> {
        let [t1, t2, t3] = self.pos_rad;
        let ee = self.fk.solve((t1, t2, t3))?;

        let mut pos_rad = HashMap::new();
        for (id, p) in ActId::arm_ids().iter().zip(self.pos_rad.iter()) {
            pos_rad.insert(*id, *p);
        }

        Ok(MechSensData {
            pos_rad,
            ee_pos_m: [ee.x, ee.y, ee.z],
        })
    }

    /// Run the simulation in a background thread.
    ///
    /// The newest demands received on `dems_rx` are tracked and a measurement is sent on
    /// `sens_tx` every period. The thread ends when either channel is closed.
    pub fn spawn(
        mut self,
        dems_rx: Receiver<MechDems>,
        sens_tx: Sender<MechSensData>,
    ) -> JoinHandle<Result<(), SimArmError>> {
        thread::spawn(move || {
            info!("SimArm started");
            let period = Duration::from_secs_f64(self.params.period_s);

            loop {
                // Keep only the newest demands
                loop {
                    match dems_rx.try_recv() {
                        Ok(d) => {
                            trace!("SimArm demands: {:?}", d.pos_rad);
                            self.set_dems(d)?;
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            debug!("SimArm demand channel closed");
                            return Ok(());
                        }
                    }
                }

                let sens = self.step(self.params.period_s)?;

                if sens_tx.send(sens).is_err() {
                    debug!("SimArm sensor channel closed");
                    return Ok(());
                }

                thread::sleep(period);
            }
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::sync::mpsc::channel;

    #[test]
    fn test_rate_limited_tracking() {
        let mut sim = SimArm::new(SimArmParams {
            period_s: 0.1,
            max_rate_rads: 1.0,
        })
        .unwrap();

        sim.set_dems(MechDems::from_joints(0.0, 0.5, -0.05)).unwrap();

        let sens = sim.step(0.1).unwrap();
        assert_abs_diff_eq!(sens.pos_rad[&ActId::ArmShoulder], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(sens.pos_rad[&ActId::ArmElbow], -0.05, epsilon = 1e-12);

        for _ in 0..10 {
            sim.step(0.1).unwrap();
        }
        let sens = sim.measure().unwrap();
        assert_abs_diff_eq!(sens.pos_rad[&ActId::ArmShoulder], 0.5, epsilon = 1e-12);

        let expected = 0.5f64.cos() + 0.45f64.cos();
        assert_abs_diff_eq!(sens.ee_pos_m[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_base_short_way() {
        let mut sim = SimArm::new(SimArmParams {
            period_s: 0.1,
            max_rate_rads: 10.0,
        })
        .unwrap();

        sim.set_dems(MechDems::from_joints(3.0, 0.0, 0.0)).unwrap();
        sim.step(1.0).unwrap();
        sim.set_dems(MechDems::from_joints(-3.0, 0.0, 0.0)).unwrap();
        let sens = sim.step(0.01).unwrap();

        // Crossing pi rather than going back through zero
        assert_abs_diff_eq!(sens.pos_rad[&ActId::ArmBase], 3.1, epsilon = 1e-12);
    }

    #[test]
    fn test_incomplete_dems() {
        let mut sim = SimArm::new(SimArmParams::default()).unwrap();
        let mut dems = MechDems::default();
        dems.pos_rad.remove(&ActId::ArmElbow);

        assert!(matches!(sim.set_dems(dems), Err(SimArmError::IncompleteDems)));
    }

    #[test]
    fn test_thread() {
        let sim = SimArm::new(SimArmParams {
            period_s: 0.001,
            max_rate_rads: 100.0,
        })
        .unwrap();

        let (dems_tx, dems_rx) = channel();
        let (sens_tx, sens_rx) = channel();
        let handle = sim.spawn(dems_rx, sens_tx);

        dems_tx.send(MechDems::from_joints(0.0, 0.0, 0.0)).unwrap();
        let sens = sens_rx.recv().unwrap();
        assert_eq!(sens.ee_pos_m.len(), 3);

        drop(dems_tx);
        drop(sens_rx);
        assert!(handle.join().unwrap().is_ok());
    }
}
