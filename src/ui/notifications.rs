use bevy::prelude::*;

use crate::systems::{CityEvent, NotificationLevel};

const NOTIFICATION_SECONDS: f32 = 4.0;

#[derive(Component)]
pub struct NotificationText;

#[derive(Resource)]
struct NotificationTimer(Timer);

pub struct NotificationPlugin;

impl Plugin for NotificationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(NotificationTimer(Timer::from_seconds(
            NOTIFICATION_SECONDS,
            TimerMode::Once,
        )))
        .add_systems(Startup, setup_notification_line)
        .add_systems(Update, (show_notifications, expire_notification).chain());
    }
}

fn setup_notification_line(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            right: Val::Px(12.0),
            ..default()
        },
        NotificationText,
    ));
}

fn show_notifications(
    mut events: EventReader<CityEvent>,
    mut timer: ResMut<NotificationTimer>,
    mut query: Query<(&mut Text, &mut TextColor), With<NotificationText>>,
) {
    for event in events.read() {
        let CityEvent::Notification { message, level } = event else {
            continue;
        };
        info!("Notification: {}", message);

        for (mut text, mut color) in &mut query {
            **text = message.clone();
            color.0 = match level {
                NotificationLevel::Info => Color::srgb(0.8, 0.95, 0.8),
                NotificationLevel::Warning => Color::srgb(1.0, 0.55, 0.4),
            };
        }
        timer.0.reset();
    }
}

fn expire_notification(
    time: Res<Time>,
    mut timer: ResMut<NotificationTimer>,
    mut query: Query<&mut Text, With<NotificationText>>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        for mut text in &mut query {
            text.clear();
        }
    }
}
