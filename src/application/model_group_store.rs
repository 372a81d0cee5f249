// Model group store - Named groups of models and their display settings
use crate::domain::error::GroupStoreError;
use crate::domain::model_group::{GroupId, GroupStoreState, Model, ModelGroup, StatValue};
use std::collections::{BTreeMap, HashMap};

type Result<T> = std::result::Result<T, GroupStoreError>;

/// Single writer of [`GroupStoreState`]. Every operation validates before it
/// writes, so a failed call leaves the state untouched.
#[derive(Debug, Clone, Default)]
pub struct ModelGroupStore {
    state: GroupStoreState,
}

impl ModelGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GroupStoreState {
        &self.state
    }

    /// Creates or updates a group and returns the id it ends up under.
    ///
    /// An existing group is renamed and its models reconciled with `model_list`:
    /// dropped models lose their settings, retained ones keep them, new ones
    /// start from the default template. An unknown id allocates a fresh one.
    pub fn set_models_of_group(
        &mut self,
        group_id: GroupId,
        group_name: &str,
        model_list: &[String],
    ) -> GroupId {
        if let Some(existing) = self.state.groups.get(&group_id) {
            let mut updated = existing.clone();
            updated.name = group_name.to_string();
            updated.model_list.retain(|model| model_list.contains(model));
            updated.models.retain(|model, _| model_list.contains(model));
            for model in model_list {
                updated.add_model(model);
            }

            tracing::debug!(
                "Updated group {} ({} models)",
                group_id,
                updated.model_list.len()
            );
            self.state.groups.insert(group_id, updated);
            return group_id;
        }

        let new_id = self.state.id_counter;
        self.state.id_counter += 1;
        self.state.group_ids.push(new_id);
        self.state.groups.insert(
            new_id,
            ModelGroup::new(new_id, group_name.to_string(), model_list),
        );

        tracing::debug!("Created group {} \"{}\"", new_id, group_name);
        new_id
    }

    pub fn delete_group(&mut self, group_id: GroupId) -> Result<()> {
        self.group(group_id)?;
        self.state.group_ids.retain(|id| *id != group_id);
        self.state.groups.remove(&group_id);
        tracing::debug!("Deleted group {}", group_id);
        Ok(())
    }

    /// Overwrites the settings of every model in the group. `per_model_data` must
    /// cover each of them; entries for models outside the group are ignored.
    pub fn update_group_model_properties(
        &mut self,
        group_id: GroupId,
        per_model_data: &HashMap<String, Model>,
    ) -> Result<()> {
        let group = self.group(group_id)?;

        let mut models = BTreeMap::new();
        for model in &group.model_list {
            let properties = per_model_data.get(model).ok_or_else(|| {
                GroupStoreError::MissingModelProperties {
                    group_id,
                    model: model.clone(),
                }
            })?;
            models.insert(model.clone(), properties.clone());
        }

        self.group_mut(group_id)?.models = models;
        Ok(())
    }

    pub fn set_group_stat_value_visibility(
        &mut self,
        group_id: GroupId,
        stat_value: StatValue,
        is_included: bool,
    ) -> Result<()> {
        self.group_mut(group_id)?
            .visible_statistical_values
            .insert(stat_value, is_included);
        Ok(())
    }

    /// Same as [`Self::set_group_stat_value_visibility`] for an untyped tag.
    /// The tag is checked before the group id.
    pub fn set_group_stat_value_visibility_by_tag(
        &mut self,
        group_id: GroupId,
        stat_value: &str,
        is_included: bool,
    ) -> Result<()> {
        let stat_value: StatValue = stat_value.parse()?;
        self.set_group_stat_value_visibility(group_id, stat_value, is_included)
    }

    pub fn set_group_visibility(&mut self, group_id: GroupId, is_visible: bool) -> Result<()> {
        self.group_mut(group_id)?.is_visible = is_visible;
        Ok(())
    }

    pub fn group_ids(&self) -> &[GroupId] {
        &self.state.group_ids
    }

    pub fn group(&self, group_id: GroupId) -> Result<&ModelGroup> {
        self.state
            .groups
            .get(&group_id)
            .ok_or(GroupStoreError::UnknownGroup { group_id })
    }

    pub fn models_of_group(&self, group_id: GroupId) -> Result<&[String]> {
        Ok(&self.group(group_id)?.model_list)
    }

    pub fn model_data_of_group(&self, group_id: GroupId) -> Result<&BTreeMap<String, Model>> {
        Ok(&self.group(group_id)?.models)
    }

    pub fn name_of_group(&self, group_id: GroupId) -> Result<&str> {
        Ok(&self.group(group_id)?.name)
    }

    pub fn stat_value_visibility_of_group(
        &self,
        group_id: GroupId,
    ) -> Result<&BTreeMap<StatValue, bool>> {
        Ok(&self.group(group_id)?.visible_statistical_values)
    }

    pub fn visibility_of_group(&self, group_id: GroupId) -> Result<bool> {
        Ok(self.group(group_id)?.is_visible)
    }

    fn group_mut(&mut self, group_id: GroupId) -> Result<&mut ModelGroup> {
        self.state
            .groups
            .get_mut(&group_id)
            .ok_or(GroupStoreError::UnknownGroup { group_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn assert_consistent(store: &ModelGroupStore) {
        let state = store.state();
        let mut ids = state.group_ids.clone();
        ids.sort();
        assert_eq!(ids, state.groups.keys().copied().collect::<Vec<_>>());
        for group in state.groups.values() {
            assert!(group.id < state.id_counter);
            let mut listed = group.model_list.clone();
            listed.sort();
            assert_eq!(listed, group.models.keys().cloned().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_new_group_uses_default_template() {
        let mut store = ModelGroupStore::new();
        let id = store.set_models_of_group(42, "refC2", &models(&["a", "b"]));

        assert_eq!(id, 0);
        assert_eq!(store.group_ids(), &[0]);
        assert_eq!(store.name_of_group(id).unwrap(), "refC2");
        assert_eq!(store.models_of_group(id).unwrap(), &models(&["a", "b"])[..]);
        assert!(store
            .model_data_of_group(id)
            .unwrap()
            .values()
            .all(|m| *m == Model::default()));
        assert!(store.visibility_of_group(id).unwrap());
        assert_consistent(&store);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut store = ModelGroupStore::new();
        let first = store.set_models_of_group(0, "first", &models(&["a"]));
        store.delete_group(first).unwrap();
        let second = store.set_models_of_group(first, "second", &models(&["a"]));

        assert_ne!(first, second);
        assert_eq!(store.state().id_counter, 2);
        assert_consistent(&store);
    }

    #[test]
    fn test_update_reconciles_models_and_keeps_settings() {
        let mut store = ModelGroupStore::new();
        let id = store.set_models_of_group(0, "group", &models(&["a", "b", "c"]));

        let mut data = HashMap::new();
        for name in ["a", "b", "c"] {
            data.insert(
                name.to_string(),
                Model {
                    color: Some("red".to_string()),
                    mean: false,
                    ..Model::default()
                },
            );
        }
        store.update_group_model_properties(id, &data).unwrap();

        let same_id = store.set_models_of_group(id, "renamed", &models(&["c", "d", "a"]));
        assert_eq!(same_id, id);
        assert_eq!(store.group_ids().len(), 1);
        assert_eq!(store.name_of_group(id).unwrap(), "renamed");
        assert_eq!(store.models_of_group(id).unwrap(), &models(&["a", "c", "d"])[..]);

        let model_data = store.model_data_of_group(id).unwrap();
        assert_eq!(model_data["a"].color.as_deref(), Some("red"));
        assert!(!model_data["c"].mean);
        assert_eq!(model_data["d"], Model::default());
        assert!(!model_data.contains_key("b"));
        assert_consistent(&store);
    }

    #[test]
    fn test_delete_group() {
        let mut store = ModelGroupStore::new();
        let id = store.set_models_of_group(0, "group", &models(&["a"]));

        assert_eq!(
            store.delete_group(7),
            Err(GroupStoreError::UnknownGroup { group_id: 7 })
        );
        store.delete_group(id).unwrap();
        assert!(store.group_ids().is_empty());
        assert!(store.state().groups.is_empty());
        assert_eq!(
            store.name_of_group(id),
            Err(GroupStoreError::UnknownGroup { group_id: id })
        );
    }

    #[test]
    fn test_update_properties_requires_every_model() {
        let mut store = ModelGroupStore::new();
        let id = store.set_models_of_group(0, "group", &models(&["a", "b"]));
        let before = store.state().clone();

        let mut data = HashMap::new();
        data.insert(
            "a".to_string(),
            Model {
                is_visible: false,
                ..Model::default()
            },
        );

        assert_eq!(
            store.update_group_model_properties(id, &data),
            Err(GroupStoreError::MissingModelProperties {
                group_id: id,
                model: "b".to_string(),
            })
        );
        assert_eq!(store.state(), &before);

        assert_eq!(
            store.update_group_model_properties(9, &data),
            Err(GroupStoreError::UnknownGroup { group_id: 9 })
        );
    }

    #[test]
    fn test_stat_value_visibility() {
        let mut store = ModelGroupStore::new();
        let id = store.set_models_of_group(0, "group", &models(&["a"]));

        store
            .set_group_stat_value_visibility(id, StatValue::Median, false)
            .unwrap();
        store
            .set_group_stat_value_visibility_by_tag(id, "percentile", false)
            .unwrap();

        let visibility = store.stat_value_visibility_of_group(id).unwrap();
        assert!(!visibility[&StatValue::Median]);
        assert!(!visibility[&StatValue::Percentile]);
        assert!(visibility[&StatValue::Mean]);

        assert!(matches!(
            store.set_group_stat_value_visibility_by_tag(99, "variance", true),
            Err(GroupStoreError::InvalidStatValue { .. })
        ));
        assert_eq!(
            store.set_group_stat_value_visibility(99, StatValue::Mean, true),
            Err(GroupStoreError::UnknownGroup { group_id: 99 })
        );
    }

    #[test]
    fn test_group_visibility() {
        let mut store = ModelGroupStore::new();
        let id = store.set_models_of_group(0, "group", &models(&["a"]));

        store.set_group_visibility(id, false).unwrap();
        assert!(!store.visibility_of_group(id).unwrap());
        assert_eq!(
            store.set_group_visibility(5, true),
            Err(GroupStoreError::UnknownGroup { group_id: 5 })
        );
    }
}
