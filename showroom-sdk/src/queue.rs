use std::path::PathBuf;

/// One render job: a single artifact to produce (a skin preview, a baked
/// shadow set, a track map).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
	/// Stable identifier, unique within the queue (e.g. "ks_audi_r8/red").
	pub id: String,
	/// Human-readable name used in progress messages.
	pub name: String,
	/// Directory holding the source data the driver renders from.
	pub source: PathBuf,
	/// Where the artifact lands, unless overridden at run time.
	pub destination: PathBuf,
	/// Identifier of the owning [`WorkItem`], for labelling only.
	pub item_id: String,
}

/// One top-level entity to process (a car, a track). An item with no
/// units is valid and is skipped by the runner without affecting
/// aggregate progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
	pub id: String,
	/// Root of the entity's data on disk.
	pub source: PathBuf,
	pub units: Vec<WorkUnit>,
}

/// An ordered batch of work. Caller-supplied order is preserved: it drives
/// both the progress fractions and the order of the run's outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkQueue {
	items: Vec<WorkItem>,
}

impl WorkQueue {
	pub fn new(items: Vec<WorkItem>) -> Self {
		Self { items }
	}

	pub fn items(&self) -> &[WorkItem] {
		&self.items
	}

	pub fn item_count(&self) -> usize {
		self.items.len()
	}

	/// Total number of render jobs across all items; the runner derives
	/// its progress step size from this.
	pub fn unit_count(&self) -> usize {
		self.items.iter().map(|item| item.units.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.unit_count() == 0
	}

	/// Drops units the caller has decided not to regenerate (e.g. stamped
	/// as current). Emptied items stay in the queue; the runner skips them.
	pub fn retain_units<F>(&mut self, mut keep: F)
	where
		F: FnMut(&WorkUnit) -> bool,
	{
		for item in &mut self.items {
			item.units.retain(|unit| keep(unit));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn unit(item: &str, id: &str) -> WorkUnit {
		WorkUnit {
			id: format!("{item}/{id}"),
			name: format!("{item}/{id}"),
			source: PathBuf::from(format!("/content/{item}/{id}")),
			destination: PathBuf::from(format!("/content/{item}/{id}/preview.jpg")),
			item_id: item.to_string(),
		}
	}

	#[test]
	fn unit_count_sums_across_items() {
		let queue = WorkQueue::new(vec![
			WorkItem {
				id: "a".into(),
				source: PathBuf::from("/content/a"),
				units: vec![unit("a", "1"), unit("a", "2")],
			},
			WorkItem {
				id: "b".into(),
				source: PathBuf::from("/content/b"),
				units: vec![],
			},
			WorkItem {
				id: "c".into(),
				source: PathBuf::from("/content/c"),
				units: vec![unit("c", "1")],
			},
		]);
		assert_eq!(queue.item_count(), 3);
		assert_eq!(queue.unit_count(), 3);
		assert!(!queue.is_empty());
	}

	#[test]
	fn retain_units_keeps_emptied_items() {
		let mut queue = WorkQueue::new(vec![WorkItem {
			id: "a".into(),
			source: PathBuf::from("/content/a"),
			units: vec![unit("a", "1"), unit("a", "2")],
		}]);
		queue.retain_units(|unit| unit.id.ends_with("2"));
		assert_eq!(queue.item_count(), 1);
		assert_eq!(queue.unit_count(), 1);

		queue.retain_units(|_| false);
		assert_eq!(queue.item_count(), 1);
		assert!(queue.is_empty());
	}
}
