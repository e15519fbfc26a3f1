//! Session driver for the local control node.

use doorlock_core::{
    Command, Outcome, Result,
    types::{TrialCounter, TrialPolicy},
};
use doorlock_hardware::{AlarmDevice, CredentialStore, DoorMotor};
use doorlock_link::Link;
use doorlock_timing::{AlarmTimer, DoorSequencer, TickClock};
use tracing::{debug, info, warn};

/// The control-side session.
///
/// Runs the protocol from the local end: receive the enrollment pair,
/// then serve commands. Each access attempt is verified against the
/// store and answered with an outcome flag; consecutive rejections are
/// tracked and eventually sound the alarm.
///
/// Generic over the link transport and the devices so the same driver
/// runs against mocks, the in-process emulator, and real hardware.
pub struct LocalController<L, S, M, A> {
    link: L,
    store: S,
    motor: M,
    alarm: A,
    clock: TickClock,
    trials: TrialCounter,
}

impl<L, S, M, A> LocalController<L, S, M, A>
where
    L: Link,
    S: CredentialStore,
    M: DoorMotor,
    A: AlarmDevice,
{
    /// Create a controller over the given link, store, and actuators.
    ///
    /// The clock paces the door cycle and the alarm period; production
    /// callers attach a periodic ticker to it, tests advance it directly.
    pub fn new(link: L, store: S, motor: M, alarm: A, clock: TickClock) -> Self {
        Self {
            link,
            store,
            motor,
            alarm,
            clock,
            trials: TrialCounter::new(),
        }
    }

    /// Run the session until the link closes.
    ///
    /// # Errors
    ///
    /// Returns `Error::LinkClosed` when the remote node disconnects, or
    /// any device error.
    pub async fn run(&mut self) -> Result<()> {
        info!("control session started, awaiting enrollment");
        self.enroll().await?;

        loop {
            let byte = self.link.recv_byte().await?;
            match Command::from_byte(byte) {
                Ok(Command::OpenDoor) => self.handle_open().await?,
                Ok(Command::ChangeCredential) => self.handle_change_credential().await?,
                Err(err) => debug!(%err, "ignoring unexpected byte"),
            }
        }
    }

    /// Receive entry pairs until one matches, then store it.
    ///
    /// The outcome flag is sent before the store is written, so the
    /// remote side learns the result as soon as the comparison is done.
    async fn enroll(&mut self) -> Result<()> {
        loop {
            let first = self.link.recv_credential().await?;
            let second = self.link.recv_credential().await?;

            if first == second {
                self.link.send_outcome(Outcome::Match).await?;
                self.store.store_credential(&first).await?;
                info!("credential enrolled");
                return Ok(());
            }

            warn!("enrollment entries differ");
            self.link.send_outcome(Outcome::Mismatch).await?;
        }
    }

    async fn handle_open(&mut self) -> Result<()> {
        if self.authenticate().await? {
            self.run_door_cycle().await?;
        }
        Ok(())
    }

    async fn handle_change_credential(&mut self) -> Result<()> {
        if self.authenticate().await? {
            self.enroll().await?;
        }
        Ok(())
    }

    /// Verify attempts until one matches or the trial budget runs out.
    ///
    /// Returns `true` on a match. On too many consecutive rejections the
    /// alarm period runs to completion and `false` is returned; the
    /// session then goes back to awaiting commands.
    async fn authenticate(&mut self) -> Result<bool> {
        loop {
            let attempt = self.link.recv_credential().await?;
            let stored = self.store.load_credential_bytes().await?;
            let outcome = if attempt.matches_bytes(&stored) {
                Outcome::Match
            } else {
                Outcome::Mismatch
            };
            self.link.send_outcome(outcome).await?;

            if outcome.is_match() {
                self.trials.record_success();
                return Ok(true);
            }

            match self.trials.record_mismatch() {
                TrialPolicy::Retry => {
                    warn!(failures = self.trials.failures(), "credential rejected");
                }
                TrialPolicy::SoundAlarm => {
                    warn!("too many consecutive rejections");
                    self.sound_alarm().await?;
                    return Ok(false);
                }
            }
        }
    }

    /// Drive the motor through one full open-hold-close cycle.
    async fn run_door_cycle(&mut self) -> Result<()> {
        let mut sequencer = DoorSequencer::new();
        self.clock.reset();

        let state = sequencer.start();
        self.motor.rotate(state.motor_command()).await?;

        while let Some(deadline) = sequencer.next_deadline() {
            self.clock.wait_until(deadline).await;
            if let Some(next) = sequencer.poll(self.clock.now()) {
                self.motor.rotate(next.motor_command()).await?;
            }
        }

        info!("door cycle complete");
        Ok(())
    }

    /// Sound the alarm for the danger period.
    async fn sound_alarm(&mut self) -> Result<()> {
        let mut timer = AlarmTimer::new();
        self.clock.reset();

        timer.start();
        self.alarm.activate().await?;

        while let Some(deadline) = timer.next_deadline() {
            self.clock.wait_until(deadline).await;
            timer.poll(self.clock.now());
        }

        self.alarm.deactivate().await?;
        info!("alarm period ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_core::{Credential, Error, types::MotorDirection};
    use doorlock_hardware::mock::{
        MemoryEeprom, MockAlarm, MockAlarmHandle, MockMotor, MockMotorHandle,
    };
    use doorlock_link::{ChannelLink, channel_pair};
    use doorlock_timing::Ticker;
    use std::time::Duration;
    use tokio::task::JoinHandle;

    struct Rig {
        remote: ChannelLink,
        motor: MockMotorHandle,
        alarm: MockAlarmHandle,
        task: JoinHandle<Result<()>>,
        _ticker: Ticker,
    }

    /// Spawn a controller over fresh mocks with a fast tick.
    fn spawn_controller() -> Rig {
        let (local, remote) = channel_pair(64);
        let clock = TickClock::new();
        let ticker = clock.start_periodic(Duration::from_millis(1));
        let (motor, motor_handle) = MockMotor::new();
        let (alarm, alarm_handle) = MockAlarm::new();

        let mut controller =
            LocalController::new(local, MemoryEeprom::new(), motor, alarm, clock);
        let task = tokio::spawn(async move { controller.run().await });

        Rig {
            remote,
            motor: motor_handle,
            alarm: alarm_handle,
            task,
            _ticker: ticker,
        }
    }

    async fn wait_for(cond: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    async fn enroll(remote: &mut ChannelLink, credential: &Credential) {
        remote.send_credential(credential).await.unwrap();
        remote.send_credential(credential).await.unwrap();
        assert_eq!(remote.recv_outcome().await.unwrap(), Outcome::Match);
    }

    #[tokio::test]
    async fn test_enrolled_credential_opens_the_door() {
        let mut rig = spawn_controller();
        let credential = Credential::new([1, 2, 3, 4, 5]).unwrap();
        enroll(&mut rig.remote, &credential).await;

        rig.remote.send_command(Command::OpenDoor).await.unwrap();
        rig.remote.send_credential(&credential).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Match);

        let motor = rig.motor.clone();
        wait_for(move || motor.commands().len() >= 4).await;

        assert_eq!(
            rig.motor.commands(),
            vec![
                MotorDirection::Forward,
                MotorDirection::Stop,
                MotorDirection::Reverse,
                MotorDirection::Stop,
            ]
        );
        assert!(rig.alarm.events().is_empty());
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_enrollment_retries_until_entries_match() {
        let mut rig = spawn_controller();

        let first = Credential::new([1, 1, 1, 1, 1]).unwrap();
        let second = Credential::new([2, 2, 2, 2, 2]).unwrap();
        rig.remote.send_credential(&first).await.unwrap();
        rig.remote.send_credential(&second).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Mismatch);

        enroll(&mut rig.remote, &first).await;
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_third_rejection_sounds_the_alarm() {
        let mut rig = spawn_controller();
        let credential = Credential::new([1, 2, 3, 4, 5]).unwrap();
        let wrong = Credential::new([9, 9, 9, 9, 9]).unwrap();
        enroll(&mut rig.remote, &credential).await;

        rig.remote.send_command(Command::OpenDoor).await.unwrap();
        for _ in 0..3 {
            rig.remote.send_credential(&wrong).await.unwrap();
            assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Mismatch);
        }

        // Alarm on, then off after the danger period
        let alarm = rig.alarm.clone();
        wait_for(move || alarm.events().len() >= 2).await;
        assert_eq!(rig.alarm.events(), vec![true, false]);
        assert!(rig.motor.commands().is_empty());

        // The session keeps serving afterwards
        rig.remote.send_command(Command::OpenDoor).await.unwrap();
        rig.remote.send_credential(&credential).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Match);
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_retry_after_single_rejection() {
        let mut rig = spawn_controller();
        let credential = Credential::new([1, 2, 3, 4, 5]).unwrap();
        let wrong = Credential::new([5, 4, 3, 2, 1]).unwrap();
        enroll(&mut rig.remote, &credential).await;

        rig.remote.send_command(Command::OpenDoor).await.unwrap();
        rig.remote.send_credential(&wrong).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Mismatch);

        // Same request; no new command byte is needed between retries
        rig.remote.send_credential(&credential).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Match);
        assert!(rig.alarm.events().is_empty());
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_change_credential_reenrolls() {
        let mut rig = spawn_controller();
        let old = Credential::new([1, 2, 3, 4, 5]).unwrap();
        let new = Credential::new([6, 7, 8, 9, 0]).unwrap();
        enroll(&mut rig.remote, &old).await;

        rig.remote
            .send_command(Command::ChangeCredential)
            .await
            .unwrap();
        rig.remote.send_credential(&old).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Match);

        enroll(&mut rig.remote, &new).await;

        // The old credential no longer opens the door
        rig.remote.send_command(Command::OpenDoor).await.unwrap();
        rig.remote.send_credential(&old).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Mismatch);
        rig.remote.send_credential(&new).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Match);
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_unexpected_byte_is_skipped() {
        let mut rig = spawn_controller();
        let credential = Credential::new([1, 2, 3, 4, 5]).unwrap();
        enroll(&mut rig.remote, &credential).await;

        rig.remote.send_byte(0xAA).await.unwrap();

        rig.remote.send_command(Command::OpenDoor).await.unwrap();
        rig.remote.send_credential(&credential).await.unwrap();
        assert_eq!(rig.remote.recv_outcome().await.unwrap(), Outcome::Match);
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_session_ends_when_link_closes() {
        let mut rig = spawn_controller();
        let credential = Credential::new([1, 2, 3, 4, 5]).unwrap();
        enroll(&mut rig.remote, &credential).await;

        drop(rig.remote);
        let result = rig.task.await.unwrap();
        assert!(matches!(result, Err(Error::LinkClosed)));
    }
}
