use std::time::Duration;

use bevy::app::AppExit;
use bevy::prelude::*;

use crate::systems::building::BuildingRegistry;
use crate::systems::catalog::BuildingCatalog;
use crate::systems::events::{CityEvent, EventSink};

#[derive(Resource, Clone)]
pub struct EconomySettings {
    pub starting_gold: i64,
    pub income_interval: Duration,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            starting_gold: 100,
            income_interval: Duration::from_secs(5),
        }
    }
}

/// The gold balance. Never negative: every change goes through
/// [`EconomyLedger::try_adjust`] or [`EconomyLedger::set_balance`].
#[derive(Resource, Debug)]
pub struct EconomyLedger {
    balance: i64,
}

impl Default for EconomyLedger {
    fn default() -> Self {
        Self::new(EconomySettings::default().starting_gold)
    }
}

impl EconomyLedger {
    pub fn new(balance: i64) -> Self {
        Self {
            balance: balance.max(0),
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Applies `delta` unless the result would be negative (or overflow).
    pub fn try_adjust(&mut self, delta: i64, bus: &mut impl EventSink) -> bool {
        let Some(next) = self.balance.checked_add(delta) else {
            return false;
        };
        if next < 0 {
            return false;
        }

        self.balance = next;
        bus.publish(CityEvent::EconomyStateChanged { gold: next });
        true
    }

    /// Overwrites the balance. Only used when restoring a save.
    pub fn set_balance(&mut self, value: i64, bus: &mut impl EventSink) {
        if value < 0 {
            warn!("Clamping negative saved balance {} to 0", value);
        }
        self.balance = value.max(0);
        bus.publish(CityEvent::EconomyStateChanged { gold: self.balance });
    }
}

/// Drives passive income. Cancelling discards the partially elapsed wait.
#[derive(Resource, Debug)]
pub struct IncomeTimer {
    timer: Timer,
    cancelled: bool,
}

impl IncomeTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: Timer::new(interval, TimerMode::Repeating),
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.timer.reset();
    }

    pub fn resume(&mut self) {
        self.cancelled = false;
        self.timer.reset();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Advances the wait and returns how many full intervals elapsed.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        if self.cancelled {
            return 0;
        }
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }
}

/// One income tick: credits the registry's total income if it is positive.
pub fn collect_income(
    registry: &BuildingRegistry,
    catalog: &BuildingCatalog,
    ledger: &mut EconomyLedger,
    bus: &mut impl EventSink,
) -> i64 {
    let income = registry.total_income(catalog);
    if income > 0 && ledger.try_adjust(income, bus) {
        income
    } else {
        0
    }
}

pub fn accrue_passive_income(
    time: Res<Time>,
    mut timer: ResMut<IncomeTimer>,
    registry: Res<BuildingRegistry>,
    catalog: Res<BuildingCatalog>,
    mut ledger: ResMut<EconomyLedger>,
    mut bus: EventWriter<CityEvent>,
) {
    let ticks = timer.advance(time.delta());
    for _ in 0..ticks {
        let income = collect_income(&registry, &catalog, &mut ledger, &mut bus);
        if income > 0 {
            debug!("Passive income +{} (balance {})", income, ledger.balance());
        }
    }
}

fn cancel_income_on_exit(mut exit_events: EventReader<AppExit>, mut timer: ResMut<IncomeTimer>) {
    if exit_events.read().next().is_some() && !timer.is_cancelled() {
        timer.cancel();
        info!("Income loop stopped");
    }
}

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EconomySettings>();
        let settings = app.world().resource::<EconomySettings>().clone();
        if !app.world().contains_resource::<EconomyLedger>() {
            app.insert_resource(EconomyLedger::new(settings.starting_gold));
        }
        app.insert_resource(IncomeTimer::new(settings.income_interval))
            .add_systems(
                Update,
                (accrue_passive_income, cancel_income_on_exit)
                    .chain()
                    .run_if(resource_exists::<IncomeTimer>),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;

    #[test]
    fn rejects_adjustments_below_zero() {
        let mut ledger = EconomyLedger::new(40);
        let mut events = Vec::new();

        assert!(!ledger.try_adjust(-41, &mut events));
        assert_eq!(ledger.balance(), 40);
        assert!(events.is_empty());

        assert!(ledger.try_adjust(-40, &mut events));
        assert_eq!(ledger.balance(), 0);
        assert_eq!(events, vec![CityEvent::EconomyStateChanged { gold: 0 }]);
    }

    #[test]
    fn balance_never_observed_negative() {
        let mut ledger = EconomyLedger::new(10);
        let mut events = Vec::new();
        let deltas = [5, -20, -15, 7, -3, -100, 50, -51, -50, 1];
        for delta in deltas {
            let before = ledger.balance();
            let applied = ledger.try_adjust(delta, &mut events);
            assert!(ledger.balance() >= 0);
            if applied {
                assert_eq!(ledger.balance(), before + delta);
            } else {
                assert_eq!(ledger.balance(), before);
            }
            let overdraw = -(ledger.balance() + 1);
            assert!(!ledger.try_adjust(overdraw, &mut events));
        }
    }

    #[test]
    fn rejects_overflow() {
        let mut ledger = EconomyLedger::new(i64::MAX - 1);
        let mut events = Vec::new();
        assert!(!ledger.try_adjust(2, &mut events));
        assert_eq!(ledger.balance(), i64::MAX - 1);
    }

    #[test]
    fn set_balance_publishes_and_clamps() {
        let mut ledger = EconomyLedger::new(0);
        let mut events = Vec::new();
        ledger.set_balance(250, &mut events);
        ledger.set_balance(-5, &mut events);
        assert_eq!(ledger.balance(), 0);
        assert_eq!(
            events,
            vec![
                CityEvent::EconomyStateChanged { gold: 250 },
                CityEvent::EconomyStateChanged { gold: 0 },
            ]
        );
    }

    #[test]
    fn timer_counts_whole_intervals_only() {
        let mut timer = IncomeTimer::new(Duration::from_secs(5));
        assert_eq!(timer.advance(Duration::from_millis(4_900)), 0);
        assert_eq!(timer.advance(Duration::from_millis(100)), 1);
        assert_eq!(timer.advance(Duration::from_secs(11)), 2);
    }

    #[test]
    fn cancelled_timer_drops_partial_wait() {
        let mut timer = IncomeTimer::new(Duration::from_secs(5));
        assert_eq!(timer.advance(Duration::from_secs(4)), 0);
        timer.cancel();
        assert_eq!(timer.advance(Duration::from_secs(10)), 0);

        timer.resume();
        assert_eq!(timer.advance(Duration::from_secs(1)), 0);
        assert_eq!(timer.advance(Duration::from_secs(4)), 1);
    }

    #[test]
    fn income_tick_adds_total_income_once() {
        let catalog = crate::systems::catalog::BuildingCatalog::default();
        let mut registry = BuildingRegistry::default();
        registry.add(BuildingInstance::new("house".into(), GridPosition::new(0, 0)));
        registry.add(BuildingInstance::new("mine".into(), GridPosition::new(4, 4)));
        let mut ledger = EconomyLedger::new(10);
        let mut events = Vec::new();

        assert_eq!(collect_income(&registry, &catalog, &mut ledger, &mut events), 6);
        assert_eq!(ledger.balance(), 16);
    }

    #[test]
    fn income_tick_without_buildings_is_silent() {
        let catalog = crate::systems::catalog::BuildingCatalog::default();
        let registry = BuildingRegistry::default();
        let mut ledger = EconomyLedger::new(10);
        let mut events = Vec::new();

        assert_eq!(collect_income(&registry, &catalog, &mut ledger, &mut events), 0);
        assert!(events.is_empty());
    }
}
