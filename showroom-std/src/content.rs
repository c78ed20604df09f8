use std::path::{Path, PathBuf};

use showroom_sdk::{
	error::Error,
	queue::{WorkItem, WorkQueue, WorkUnit},
};
use walkdir::WalkDir;

use crate::drivers::AssetKind;

/// Walks an installation root laid out as `cars/<car>/skins/<skin>/` and
/// `tracks/<track>/`, producing a queue in deterministic (sorted) order.
/// Hidden directories are skipped; `ids` restricts to the named entities.
pub fn scan(root: &Path, kind: AssetKind, ids: Option<&[String]>) -> Result<WorkQueue, Error> {
	let base = match kind {
		AssetKind::Preview | AssetKind::Shadows => root.join("cars"),
		AssetKind::TrackMap => root.join("tracks"),
	};
	if !base.is_dir() {
		return Err(Error::MissingSource { path: base });
	}

	let selected = |name: &str| ids.is_none_or(|ids| ids.iter().any(|id| id == name));
	let items = child_dirs(&base)
		.into_iter()
		.filter(|(name, _)| selected(name))
		.map(|(name, path)| {
			let units = match kind {
				AssetKind::Preview => skin_units(&name, &path),
				AssetKind::Shadows => vec![WorkUnit {
					id: name.clone(),
					name: name.clone(),
					source: path.clone(),
					destination: path.join("body_shadow.png"),
					item_id: name.clone(),
				}],
				AssetKind::TrackMap => vec![WorkUnit {
					id: name.clone(),
					name: name.clone(),
					source: path.clone(),
					destination: path.join("map.png"),
					item_id: name.clone(),
				}],
			};
			WorkItem {
				id: name,
				source: path,
				units,
			}
		})
		.collect();
	Ok(WorkQueue::new(items))
}

fn skin_units(car: &str, car_dir: &Path) -> Vec<WorkUnit> {
	let skins = car_dir.join("skins");
	if !skins.is_dir() {
		return Vec::new();
	}
	child_dirs(&skins)
		.into_iter()
		.map(|(skin, skin_dir)| WorkUnit {
			id: format!("{car}/{skin}"),
			name: format!("{car}/{skin}"),
			source: skin_dir.clone(),
			destination: skin_dir.join("preview.jpg"),
			item_id: car.to_string(),
		})
		.collect()
}

fn child_dirs(path: &Path) -> Vec<(String, PathBuf)> {
	WalkDir::new(path)
		.min_depth(1)
		.max_depth(1)
		.sort_by_file_name()
		.into_iter()
		.filter_map(|entry| entry.ok())
		.filter(|entry| entry.file_type().is_dir())
		.filter_map(|entry| {
			let name = entry.file_name().to_str()?.to_string();
			Some((name, entry.into_path()))
		})
		.filter(|(name, _)| !name.starts_with('.'))
		.collect()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn installation(root: &Path) {
		for path in [
			"cars/bmw_m3/skins/alpine_white",
			"cars/bmw_m3/skins/black",
			"cars/ks_audi/skins/red",
			"cars/no_skins_yet",
			"cars/.hidden_car/skins/x",
			"tracks/monza/data",
			"tracks/spa/data",
		] {
			std::fs::create_dir_all(root.join(path)).unwrap();
		}
	}

	#[test]
	fn preview_scan_is_sorted_and_skips_hidden() {
		let dir = tempfile::tempdir().unwrap();
		installation(dir.path());

		let queue = scan(dir.path(), AssetKind::Preview, None).unwrap();
		let ids: Vec<_> = queue
			.items()
			.iter()
			.flat_map(|item| item.units.iter().map(|unit| unit.id.as_str()))
			.collect();
		assert_eq!(ids, vec!["bmw_m3/alpine_white", "bmw_m3/black", "ks_audi/red"]);

		// the skinless car is present but contributes no units
		assert_eq!(queue.item_count(), 3);
		assert_eq!(queue.unit_count(), 3);
	}

	#[test]
	fn id_filter_restricts_the_scan() {
		let dir = tempfile::tempdir().unwrap();
		installation(dir.path());

		let ids = vec!["ks_audi".to_string()];
		let queue = scan(dir.path(), AssetKind::Preview, Some(&ids)).unwrap();
		assert_eq!(queue.item_count(), 1);
		assert_eq!(queue.items()[0].units[0].id, "ks_audi/red");
	}

	#[test]
	fn track_scan_targets_map_outputs() {
		let dir = tempfile::tempdir().unwrap();
		installation(dir.path());

		let queue = scan(dir.path(), AssetKind::TrackMap, None).unwrap();
		let destinations: Vec<_> = queue
			.items()
			.iter()
			.flat_map(|item| item.units.iter().map(|unit| unit.destination.clone()))
			.collect();
		assert_eq!(
			destinations,
			vec![
				dir.path().join("tracks/monza/map.png"),
				dir.path().join("tracks/spa/map.png"),
			]
		);
	}

	#[test]
	fn missing_base_directory_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let result = scan(dir.path(), AssetKind::Preview, None);
		assert!(matches!(result, Err(Error::MissingSource { .. })));
	}
}
