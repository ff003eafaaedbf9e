use async_lock::Mutex;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Bounded key-value store. When full, the oldest inserted key is evicted.
pub(crate) struct InMemoryStorage<K, V> {
    capacity: usize,
    storage: Mutex<Entries<K, V>>,
}

struct Entries<K, V> {
    values: HashMap<K, V>,
    insertion_order: VecDeque<K>,
}

impl<K, V> InMemoryStorage<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            storage: Mutex::new(Entries {
                values: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
        }
    }

    pub(crate) async fn save(&self, key: K, value: V) {
        let mut guard = self.storage.lock().await;

        if guard.values.insert(key.clone(), value).is_none() {
            guard.insertion_order.push_back(key);
        }

        while guard.values.len() > self.capacity {
            match guard.insertion_order.pop_front() {
                Some(oldest) => {
                    guard.values.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub(crate) async fn get(&self, key: &K) -> Option<V> {
        let guard = self.storage.lock().await;

        guard.values.get(key).cloned()
    }

    pub(crate) async fn len(&self) -> usize {
        self.storage.lock().await.values.len()
    }
}
