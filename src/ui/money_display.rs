use bevy::prelude::*;

use crate::systems::{CityEvent, EconomyLedger};

#[derive(Component)]
pub struct MoneyDisplay;

pub struct MoneyDisplayPlugin;

impl Plugin for MoneyDisplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_money_display)
            .add_systems(Update, update_money_display);
    }
}

fn setup_money_display(mut commands: Commands, ledger: Res<EconomyLedger>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::all(Val::Px(10.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.9)),
            MoneyDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(format_gold(ledger.balance())),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.8, 0.2)),
            ));
        });
}

fn update_money_display(
    mut events: EventReader<CityEvent>,
    query: Query<&Children, With<MoneyDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    let Some(gold) = events
        .read()
        .filter_map(|event| match event {
            CityEvent::EconomyStateChanged { gold } => Some(*gold),
            _ => None,
        })
        .last()
    else {
        return;
    };

    for children in &query {
        for &child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                **text = format_gold(gold);
            }
        }
    }
}

fn format_gold(gold: i64) -> String {
    format!("Gold: {}", gold)
}
