//! Snapshots of plot state.
//!
//! Plot resources implement [`Saveable`] and are registered once per app.
//! A snapshot maps each registered key to that resource's bitcode payload.
//! Where the map ends up (a file, a database row) is up to the host.

use bevy::prelude::*;
use std::collections::BTreeMap;

pub trait Saveable: Resource + Default {
    /// Key of this resource's payload in a snapshot.
    const SAVE_KEY: &'static str;

    /// `None` when there is nothing worth keeping.
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode a snapshot payload. Unreadable bytes give an empty value and a
/// warning, so one damaged payload does not block the others.
pub fn decode_snapshot<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    bitcode::decode(bytes).unwrap_or_else(|e| {
        warn!(
            "snapshot {}: {} unreadable bytes ({}), starting empty",
            key,
            bytes.len(),
            e
        );
        T::default()
    })
}

struct SnapshotSlot {
    capture: fn(&World) -> Option<Vec<u8>>,
    apply: fn(&mut World, &[u8]),
    clear: fn(&mut World),
}

fn capture_slot<T: Saveable>(world: &World) -> Option<Vec<u8>> {
    world.get_resource::<T>()?.save_to_bytes()
}

fn apply_slot<T: Saveable>(world: &mut World, bytes: &[u8]) {
    world.insert_resource(T::load_from_bytes(bytes));
}

fn clear_slot<T: Saveable>(world: &mut World) {
    world.insert_resource(T::default());
}

/// The resources that take part in snapshots, by key.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    slots: BTreeMap<&'static str, SnapshotSlot>,
}

impl SaveableRegistry {
    /// A key registered twice keeps its first resource.
    pub fn register<T: Saveable>(&mut self) {
        if self.slots.contains_key(T::SAVE_KEY) {
            warn!(
                "snapshot key {} already registered, {} ignored",
                T::SAVE_KEY,
                std::any::type_name::<T>()
            );
            return;
        }
        self.slots.insert(
            T::SAVE_KEY,
            SnapshotSlot {
                capture: capture_slot::<T>,
                apply: apply_slot::<T>,
                clear: clear_slot::<T>,
            },
        );
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn capture(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        self.slots
            .iter()
            .filter_map(|(key, slot)| Some((key.to_string(), (slot.capture)(world)?)))
            .collect()
    }

    fn apply(&self, world: &mut World, snapshot: &BTreeMap<String, Vec<u8>>) {
        for (key, slot) in &self.slots {
            match snapshot.get(*key) {
                Some(bytes) => (slot.apply)(world, bytes),
                None => (slot.clear)(world),
            }
        }
        for key in snapshot.keys() {
            if !self.slots.contains_key(key.as_str()) {
                debug!("snapshot {}: no registered resource, skipped", key);
            }
        }
    }
}

pub trait SaveableAppExt {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self;
}

impl SaveableAppExt for App {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self {
        self.init_resource::<SaveableRegistry>();
        self.world_mut()
            .resource_mut::<SaveableRegistry>()
            .register::<T>();
        self
    }
}

/// Payloads of every registered resource that has something to keep.
pub fn snapshot_world(world: &mut World) -> BTreeMap<String, Vec<u8>> {
    if !world.contains_resource::<SaveableRegistry>() {
        return BTreeMap::new();
    }
    world.resource_scope(|world, registry: Mut<SaveableRegistry>| registry.capture(world))
}

/// Load a map produced by [`snapshot_world`]. Registered resources without
/// a payload go back to empty.
pub fn restore_world(world: &mut World, snapshot: &BTreeMap<String, Vec<u8>>) {
    if !world.contains_resource::<SaveableRegistry>() {
        warn!("restore_world: no SaveableRegistry, nothing restored");
        return;
    }
    world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
        registry.apply(world, snapshot);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default, Debug, PartialEq)]
    struct Tally(u32);

    impl Saveable for Tally {
        const SAVE_KEY: &'static str = "tally";

        fn save_to_bytes(&self) -> Option<Vec<u8>> {
            (self.0 > 0).then(|| bitcode::encode(&self.0))
        }

        fn load_from_bytes(bytes: &[u8]) -> Self {
            Tally(decode_snapshot(Self::SAVE_KEY, bytes))
        }
    }

    fn app() -> App {
        let mut app = App::new();
        app.register_saveable::<Tally>();
        app.init_resource::<Tally>();
        app
    }

    #[test]
    fn test_duplicate_registration_keeps_one_key() {
        let mut app = app();
        app.register_saveable::<Tally>();
        let registry = app.world().resource::<SaveableRegistry>();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["tally"]);
    }

    #[test]
    fn test_empty_resource_left_out_of_snapshot() {
        let mut app = app();
        assert!(snapshot_world(app.world_mut()).is_empty());
    }

    #[test]
    fn test_restore_round_trip_and_reset() {
        let mut app = app();
        app.world_mut().insert_resource(Tally(7));
        let snapshot = snapshot_world(app.world_mut());
        assert!(snapshot.contains_key("tally"));

        app.world_mut().insert_resource(Tally(99));
        restore_world(app.world_mut(), &snapshot);
        assert_eq!(*app.world().resource::<Tally>(), Tally(7));

        restore_world(app.world_mut(), &BTreeMap::new());
        assert_eq!(*app.world().resource::<Tally>(), Tally(0));
    }

    #[test]
    fn test_unreadable_payload_decodes_empty() {
        let value: u32 = decode_snapshot("tally", &[]);
        assert_eq!(value, 0);
    }
}
