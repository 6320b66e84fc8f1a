//! The event loop: one task, one tick at a time.
//!
//! Each tick waits (bounded) for inbound responses, decides whether an
//! update is due (periodic on its jittered schedule, or triggered after a
//! route was poisoned) and finishes with a timer sweep over the table.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::Rng;

use rip_core::table::{RoutingTable, UpdateTrigger};

use crate::config::Config;
use crate::receiver::Receiver;
use crate::sender::Sender;

/// Upper bound on one readiness wait, so timers are checked at least once a
/// second even on an idle network.
const SELECT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Raised by the routing table when a route is poisoned; drained by the
/// daemon when it decides to send.
#[derive(Clone, Default)]
pub struct TriggerFlag(Rc<Cell<bool>>);

impl TriggerFlag {
    fn is_raised(&self) -> bool {
        self.0.get()
    }

    fn clear(&self) {
        self.0.set(false);
    }
}

impl UpdateTrigger for TriggerFlag {
    fn trigger_update(&self) {
        self.0.set(true);
    }
}

enum Action {
    SendPeriodic,
    SendTriggered,
    Hold,
}

/// When to advertise. Periodic updates fire on a jittered interval and
/// always win over a pending triggered update; triggered updates are held
/// back for a random 1–5 s after the previous one.
struct UpdateSchedule {
    update_period: Duration,
    next_periodic_at: Instant,
    triggered_timer_running: bool,
    next_triggered_at: Instant,
}

impl UpdateSchedule {
    fn new(update_period: Duration, now: Instant) -> Self {
        let mut schedule = UpdateSchedule {
            update_period,
            next_periodic_at: now,
            triggered_timer_running: false,
            next_triggered_at: now,
        };
        schedule.reschedule_periodic(now);
        schedule
    }

    fn decide(&mut self, now: Instant, update_triggered: bool) -> Action {
        if self.triggered_timer_running && now <= self.next_triggered_at {
            return Action::Hold;
        }

        if now > self.next_periodic_at {
            self.reschedule_periodic(now);
            self.triggered_timer_running = false;
            return Action::SendPeriodic;
        }

        if update_triggered {
            self.triggered_timer_running = true;
            self.next_triggered_at =
                now + Duration::from_secs_f64(rand::thread_rng().gen_range(1.0..=5.0));
            return Action::SendTriggered;
        }

        Action::Hold
    }

    /// `update_period` scaled by a fresh draw from `U(0.8, 1.2)`, so the
    /// daemons in a topology do not synchronise their updates.
    fn reschedule_periodic(&mut self, now: Instant) {
        let jitter = rand::thread_rng().gen_range(0.8..=1.2);
        self.next_periodic_at = now + self.update_period.mul_f64(jitter);
    }
}

pub struct Daemon {
    table: RoutingTable,
    receiver: Receiver,
    sender: Sender,
    schedule: UpdateSchedule,
    trigger: TriggerFlag,
}

impl Daemon {
    pub async fn new(config: Config) -> anyhow::Result<Daemon> {
        let now = Instant::now();
        let trigger = TriggerFlag::default();
        let table = RoutingTable::new(
            config.router_id,
            &config.outputs,
            config.update_period(),
            Box::new(trigger.clone()),
            now,
        );
        let receiver = Receiver::bind(&config.input_ports).await?;
        let update_period = config.update_period();
        let sender = Sender::bind(config.output_port, config.router_id, config.outputs).await?;
        let schedule = UpdateSchedule::new(update_period, now);

        Ok(Daemon {
            table,
            receiver,
            sender,
            schedule,
            trigger,
        })
    }

    pub async fn run(mut self) {
        info!("initial routing table:\n{}", self.table.render(Instant::now()));
        self.sender.send_updates(&self.table).await;

        loop {
            self.receiver
                .wait_for_messages(&mut self.table, SELECT_TIMEOUT)
                .await;

            let now = Instant::now();
            match self.schedule.decide(now, self.trigger.is_raised()) {
                Action::SendPeriodic => {
                    info!("sending periodic update");
                    self.sender.send_updates(&self.table).await;
                    self.trigger.clear();
                    debug!("routing table at periodic update:\n{}", self.table.render(now));
                }
                Action::SendTriggered => {
                    info!("sending triggered update");
                    self.sender.send_updates(&self.table).await;
                    self.trigger.clear();
                }
                Action::Hold => {}
            }

            for dest_id in self.table.check_timers(Instant::now()) {
                info!("route to router {dest_id} removed");
            }
        }
    }
}
