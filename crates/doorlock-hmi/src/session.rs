//! Session driver for the remote HMI node.

use doorlock_core::{
    Command, Credential, Outcome, Result,
    constants::{
        CREDENTIAL_LENGTH, MSG_ALARM, MSG_CORRECT_PASS, MSG_ENTER_PASS, MSG_INVALID_KEY,
        MSG_MATCHING, MSG_MENU_CHANGE, MSG_MENU_OPEN, MSG_NOT_MATCHING, MSG_REENTER_PASS,
        MSG_WRONG_PASS,
    },
    types::{TrialCounter, TrialPolicy},
};
use doorlock_hardware::{DisplayDevice, KeyPress, KeypadDevice};
use doorlock_link::Link;
use doorlock_timing::{AlarmTimer, DoorSequencer, TickClock};
use tracing::{debug, info, warn};

/// The HMI-side session.
///
/// Runs the protocol from the remote end: collect the enrollment pair,
/// then loop on the menu, sending commands and credential attempts to
/// the control node and rendering the outcome flags it returns. The
/// session mirrors the control node's trial counting so it knows when a
/// rejection means "try again" and when it means the alarm is sounding.
pub struct RemoteSession<L, K, D> {
    link: L,
    keypad: K,
    display: D,
    clock: TickClock,
    trials: TrialCounter,
}

impl<L, K, D> RemoteSession<L, K, D>
where
    L: Link,
    K: KeypadDevice,
    D: DisplayDevice,
{
    /// Create a session over the given link and panel devices.
    ///
    /// The clock paces the door cycle and alarm screens; production
    /// callers attach a periodic ticker to it, tests advance it directly.
    pub fn new(link: L, keypad: K, display: D, clock: TickClock) -> Self {
        Self {
            link,
            keypad,
            display,
            clock,
            trials: TrialCounter::new(),
        }
    }

    /// Run the session until the link or a device closes.
    ///
    /// # Errors
    ///
    /// Returns `Error::LinkClosed` when the control node disconnects, or
    /// any device error.
    pub async fn run(&mut self) -> Result<()> {
        info!("HMI session started, collecting enrollment");
        self.enroll().await?;

        loop {
            self.display.clear().await?;
            self.display.show(0, MSG_MENU_OPEN).await?;
            self.display.show(1, MSG_MENU_CHANGE).await?;

            let key = self.keypad.read_key().await?;
            match key.as_command() {
                Some(command) => {
                    debug!(%command, "menu selection");
                    self.link.send_command(command).await?;
                    self.request(command).await?;
                }
                None => {
                    self.display.clear().await?;
                    self.display.show(0, MSG_INVALID_KEY).await?;
                }
            }
        }
    }

    /// Collect entry pairs and send them until the control node accepts.
    async fn enroll(&mut self) -> Result<()> {
        loop {
            let first = self.read_entry(MSG_ENTER_PASS).await?;
            self.link.send_credential(&first).await?;

            let second = self.read_entry(MSG_REENTER_PASS).await?;
            self.link.send_credential(&second).await?;

            self.display.clear().await?;
            match self.link.recv_outcome().await? {
                Outcome::Match => {
                    info!("enrollment accepted");
                    self.display.show(0, MSG_MATCHING).await?;
                    return Ok(());
                }
                Outcome::Mismatch => {
                    warn!("enrollment entries differ");
                    self.display.show(0, MSG_NOT_MATCHING).await?;
                }
            }
        }
    }

    /// Send credential attempts for a command until one is accepted or
    /// the trial budget runs out.
    async fn request(&mut self, command: Command) -> Result<()> {
        loop {
            let attempt = self.read_entry(MSG_ENTER_PASS).await?;
            self.link.send_credential(&attempt).await?;

            let outcome = self.link.recv_outcome().await?;
            self.display.clear().await?;

            if outcome.is_match() {
                self.trials.record_success();
                match command {
                    Command::OpenDoor => self.show_door_cycle().await?,
                    Command::ChangeCredential => {
                        self.display.show(0, MSG_CORRECT_PASS).await?;
                        self.enroll().await?;
                    }
                }
                return Ok(());
            }

            match self.trials.record_mismatch() {
                TrialPolicy::Retry => {
                    warn!(failures = self.trials.failures(), "attempt rejected");
                    self.display.show(0, MSG_WRONG_PASS).await?;
                }
                TrialPolicy::SoundAlarm => {
                    warn!("too many rejections, alarm screen");
                    self.show_alarm().await?;
                    return Ok(());
                }
            }
        }
    }

    /// Prompt for one credential entry, echoing a `*` per digit.
    ///
    /// Non-digit keys are ignored while digits are being collected, and
    /// the entry is confirmed with Enter.
    async fn read_entry(&mut self, prompt: &str) -> Result<Credential> {
        self.display.clear().await?;
        self.display.show(0, prompt).await?;
        self.display.show(1, "").await?;

        let mut digits = [0u8; CREDENTIAL_LENGTH];
        let mut entered = 0;
        while entered < CREDENTIAL_LENGTH {
            if let Some(digit) = self.keypad.read_key().await?.as_digit() {
                digits[entered] = digit;
                entered += 1;
                self.display.put_char('*').await?;
            }
        }
        while !matches!(self.keypad.read_key().await?, KeyPress::Enter) {}

        Credential::new(digits)
    }

    /// Render the door cycle phases while the control node drives the
    /// motor on its own clock.
    async fn show_door_cycle(&mut self) -> Result<()> {
        let mut sequencer = DoorSequencer::new();
        self.clock.reset();

        let state = sequencer.start();
        if let Some(message) = state.display_message() {
            self.display.show(0, message).await?;
        }

        while let Some(deadline) = sequencer.next_deadline() {
            self.clock.wait_until(deadline).await;
            if let Some(next) = sequencer.poll(self.clock.now())
                && let Some(message) = next.display_message()
            {
                self.display.clear().await?;
                self.display.show(0, message).await?;
            }
        }

        info!("door cycle screen complete");
        Ok(())
    }

    /// Hold the error screen for the alarm period.
    async fn show_alarm(&mut self) -> Result<()> {
        let mut timer = AlarmTimer::new();
        self.clock.reset();

        timer.start();
        self.display.show(0, MSG_ALARM).await?;

        while let Some(deadline) = timer.next_deadline() {
            self.clock.wait_until(deadline).await;
            timer.poll(self.clock.now());
        }

        info!("alarm screen complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_hardware::mock::{
        MockDisplay, MockDisplayHandle, MockKeypad, MockKeypadHandle,
    };
    use doorlock_link::{ChannelLink, channel_pair};
    use doorlock_timing::Ticker;
    use std::time::Duration;
    use tokio::task::JoinHandle;

    struct Rig {
        peer: ChannelLink,
        keypad: MockKeypadHandle,
        display: MockDisplayHandle,
        task: JoinHandle<Result<()>>,
        _ticker: Ticker,
    }

    /// Spawn a session over fresh mocks with a fast tick.
    fn spawn_session() -> Rig {
        let (remote, peer) = channel_pair(64);
        let clock = TickClock::new();
        let ticker = clock.start_periodic(Duration::from_millis(1));
        let (keypad, keypad_handle) = MockKeypad::new();
        let (display, display_handle) = MockDisplay::new();

        let mut session = RemoteSession::new(remote, keypad, display, clock);
        let task = tokio::spawn(async move { session.run().await });

        Rig {
            peer,
            keypad: keypad_handle,
            display: display_handle,
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

    /// Type the enrollment pair and accept it from the peer side.
    async fn enroll(rig: &mut Rig, digits: &[u8]) {
        rig.keypad.send_entry(digits).await.unwrap();
        rig.keypad.send_entry(digits).await.unwrap();

        let expected = Credential::from_slice(digits).unwrap();
        assert_eq!(rig.peer.recv_credential().await.unwrap(), expected);
        assert_eq!(rig.peer.recv_credential().await.unwrap(), expected);
        rig.peer.send_outcome(Outcome::Match).await.unwrap();
    }

    #[tokio::test]
    async fn test_enrollment_sends_both_entries() {
        let mut rig = spawn_session();
        enroll(&mut rig, &[1, 2, 3, 4, 5]).await;

        let display = rig.display.clone();
        wait_for(move || display.saw_message(MSG_MENU_OPEN)).await;
        assert!(rig.display.saw_message(MSG_ENTER_PASS));
        assert!(rig.display.saw_message(MSG_REENTER_PASS));
        assert!(rig.display.saw_message(MSG_MATCHING));
        assert!(rig.display.saw_message(MSG_MENU_CHANGE));
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_enrollment_mismatch_prompts_again() {
        let mut rig = spawn_session();

        rig.keypad.send_entry(&[1, 1, 1, 1, 1]).await.unwrap();
        rig.keypad.send_entry(&[2, 2, 2, 2, 2]).await.unwrap();
        rig.peer.recv_credential().await.unwrap();
        rig.peer.recv_credential().await.unwrap();
        rig.peer.send_outcome(Outcome::Mismatch).await.unwrap();

        let display = rig.display.clone();
        wait_for(move || display.saw_message(MSG_NOT_MATCHING)).await;

        enroll(&mut rig, &[1, 1, 1, 1, 1]).await;
        let display = rig.display.clone();
        wait_for(move || display.saw_message(MSG_MATCHING)).await;
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_entry_is_masked_on_screen() {
        let rig = spawn_session();

        rig.keypad.send_digits(&[1, 2, 3, 4, 5]).await.unwrap();

        let display = rig.display.clone();
        wait_for(move || display.lines()[1] == "*****").await;
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_non_digit_keys_ignored_during_entry() {
        let mut rig = spawn_session();

        rig.keypad.send_digits(&[1, 2]).await.unwrap();
        rig.keypad.send_key(KeyPress::Plus).await.unwrap();
        rig.keypad.send_entry(&[3, 4, 5]).await.unwrap();
        rig.keypad.send_entry(&[1, 2, 3, 4, 5]).await.unwrap();

        let expected = Credential::new([1, 2, 3, 4, 5]).unwrap();
        assert_eq!(rig.peer.recv_credential().await.unwrap(), expected);
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_open_door_shows_cycle_screens() {
        let mut rig = spawn_session();
        enroll(&mut rig, &[1, 2, 3, 4, 5]).await;

        rig.keypad.send_key(KeyPress::Plus).await.unwrap();
        assert_eq!(rig.peer.recv_byte().await.unwrap(), b'+');

        rig.keypad.send_entry(&[1, 2, 3, 4, 5]).await.unwrap();
        rig.peer.recv_credential().await.unwrap();
        rig.peer.send_outcome(Outcome::Match).await.unwrap();

        let display = rig.display.clone();
        wait_for(move || {
            display.saw_message("Door Un-locking")
                && display.saw_message("Holding")
                && display.saw_message("Door Locking")
        })
        .await;
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_invalid_menu_key_shows_hint() {
        let mut rig = spawn_session();
        enroll(&mut rig, &[1, 2, 3, 4, 5]).await;

        let display = rig.display.clone();
        wait_for(move || display.saw_message(MSG_MENU_OPEN)).await;

        rig.keypad.send_key(KeyPress::Digit(9)).await.unwrap();
        let display = rig.display.clone();
        wait_for(move || display.saw_message(MSG_INVALID_KEY)).await;

        // The menu still works afterwards
        rig.keypad.send_key(KeyPress::Minus).await.unwrap();
        assert_eq!(rig.peer.recv_byte().await.unwrap(), b'-');
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_rejection_retries_then_alarm_screen() {
        let mut rig = spawn_session();
        enroll(&mut rig, &[1, 2, 3, 4, 5]).await;

        rig.keypad.send_key(KeyPress::Plus).await.unwrap();
        assert_eq!(rig.peer.recv_byte().await.unwrap(), b'+');

        for _ in 0..3 {
            rig.keypad.send_entry(&[9, 9, 9, 9, 9]).await.unwrap();
            rig.peer.recv_credential().await.unwrap();
            rig.peer.send_outcome(Outcome::Mismatch).await.unwrap();
        }

        let display = rig.display.clone();
        wait_for(move || display.saw_message(MSG_ALARM)).await;

        // Two retry prompts before the alarm screen
        let wrong_count = rig
            .display
            .history()
            .iter()
            .filter(|line| *line == MSG_WRONG_PASS)
            .count();
        assert_eq!(wrong_count, 2);

        // Back at the menu once the alarm period ends
        let display = rig.display.clone();
        wait_for(move || {
            display
                .history()
                .iter()
                .rev()
                .take_while(|line| *line != MSG_ALARM)
                .any(|line| line == MSG_MENU_OPEN)
        })
        .await;
        rig.task.abort();
    }

    #[tokio::test]
    async fn test_change_credential_reenrolls_after_match() {
        let mut rig = spawn_session();
        enroll(&mut rig, &[1, 2, 3, 4, 5]).await;

        rig.keypad.send_key(KeyPress::Minus).await.unwrap();
        assert_eq!(rig.peer.recv_byte().await.unwrap(), b'-');

        rig.keypad.send_entry(&[1, 2, 3, 4, 5]).await.unwrap();
        rig.peer.recv_credential().await.unwrap();
        rig.peer.send_outcome(Outcome::Match).await.unwrap();

        let display = rig.display.clone();
        wait_for(move || display.saw_message(MSG_CORRECT_PASS)).await;

        // A fresh enrollment round follows
        enroll(&mut rig, &[6, 7, 8, 9, 0]).await;
        let display = rig.display.clone();
        wait_for(move || display.saw_message(MSG_MATCHING)).await;
        rig.task.abort();
    }
}
