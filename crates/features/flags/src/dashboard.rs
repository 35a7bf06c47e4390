use crate::error::FlagsError;
use crate::evaluate::FeatureEvaluator;
use crate::managed::ManagedFeatureRegistration;
use crate::validate::{ChangeValidation, Verdict};
use fhub_domain::flags::{
    FeatureChangeType, FeatureFlag, FeatureFlagDto, FilterBinding, FilterDto, ManagedFeature,
};
use fhub_domain::options::{DashboardOptions, FeatureSeed};
use fhub_filters::{FeatureFilter, FilterRegistry};
use fhub_store::{FlagStore, FlagUpdate, StoreError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Assembles a [`Dashboard`], pre-registering the built-in `Percentage` and
/// `TimeWindow` filter types.
pub struct DashboardBuilder {
    store: Arc<dyn FlagStore>,
    registry: FilterRegistry,
}

impl fmt::Debug for DashboardBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardBuilder").field("registry", &self.registry).finish_non_exhaustive()
    }
}

impl DashboardBuilder {
    /// # Errors
    /// Fails only if a built-in filter's default settings cannot be
    /// serialized, which indicates a broken build rather than bad input.
    pub fn new(store: Arc<dyn FlagStore>) -> Result<Self, FlagsError> {
        use fhub_filters::builtin::{
            PercentageFilter, PercentageFilterSettings, TimeWindowFilter, TimeWindowFilterSettings,
        };

        let registry = FilterRegistry::new();
        registry
            .register(PercentageFilter, PercentageFilterSettings { value: 50.0 })
            .map_err(|e| FlagsError::internal(e.to_string()))?;
        registry
            .register(TimeWindowFilter, TimeWindowFilterSettings { start: None, end: None })
            .map_err(|e| FlagsError::internal(e.to_string()))?;
        Ok(Self { store, registry })
    }

    /// Registers an additional filter type with its default settings.
    ///
    /// # Errors
    /// Fails if the default settings cannot be serialized to JSON.
    pub fn register_filter<F: FeatureFilter>(
        self,
        filter: F,
        default_settings: F::Settings,
    ) -> Result<Self, FlagsError> {
        self.registry
            .register(filter, default_settings)
            .map_err(|e| FlagsError::internal(e.to_string()))?;
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> Dashboard {
        let managed = ManagedFeatureRegistration::new();
        let validation = ChangeValidation::new(self.registry.clone(), managed.clone());
        let evaluator = FeatureEvaluator::new(Arc::clone(&self.store), self.registry.clone());
        Dashboard {
            store: self.store,
            registry: self.registry,
            managed,
            validation,
            evaluator,
        }
    }
}

/// The composed feature-management handle: filter registry, managed set,
/// validation pipeline, evaluator, and store behind one cloneable facade.
///
/// Admin operations (`create`/`update`/`delete`) run the validation pipeline
/// before touching the store, so a cancelled change never leaves a partial
/// write behind.
#[derive(Clone)]
pub struct Dashboard {
    store: Arc<dyn FlagStore>,
    registry: FilterRegistry,
    managed: ManagedFeatureRegistration,
    validation: ChangeValidation,
    evaluator: FeatureEvaluator,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("registry", &self.registry)
            .field("managed", &self.managed)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    #[must_use]
    pub fn evaluator(&self) -> &FeatureEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn validation(&self) -> &ChangeValidation {
        &self.validation
    }

    /// Installs the custom change-veto hook; the last installation wins.
    pub fn on_feature_changing<F>(&self, hook: F)
    where
        F: Fn(&FeatureFlagDto, FeatureChangeType) -> Verdict + Send + Sync + 'static,
    {
        self.validation.set_custom(hook);
    }

    /// Declares a managed flag and provisions it in the store if absent.
    ///
    /// Duplicate declarations log a warning and change nothing. A storage
    /// conflict on the provisioning create is tolerated — another replica
    /// seeded the flag first.
    ///
    /// # Errors
    /// Propagates store failures other than the tolerated conflict.
    pub async fn register_managed(&self, seed: ManagedFeature) -> Result<(), FlagsError> {
        if !self.managed.try_register(&seed.name, seed.filter.clone()) {
            warn!(feature = %seed.name, "Managed feature already registered, skipping");
            return Ok(());
        }

        if self.store.get_by_name(&seed.name).await?.is_some() {
            return Ok(());
        }

        let mut flag = FeatureFlag::new(&seed.name, seed.is_enabled, Some(seed.description));
        if let Some(requirement) = &seed.filter {
            flag = flag.with_filter(FilterBinding::new(
                &requirement.type_name,
                Some(requirement.default_settings_json.clone()),
            ));
        }
        match self.store.create(flag).await {
            Ok(_) => {
                info!(feature = %seed.name, "Managed feature provisioned");
                Ok(())
            },
            Err(StoreError::Conflict { .. }) => {
                debug!(feature = %seed.name, "Managed feature created concurrently");
                Ok(())
            },
            Err(other) => Err(other.into()),
        }
    }

    /// Reconciles the store against a declarative options script, in fixed
    /// order: deletes, then add-if-missing seeds, then unconditional upserts.
    /// Re-applying the same script is a no-op.
    ///
    /// # Errors
    /// Propagates store failures; absent names in `delete` are ignored.
    pub async fn apply_options(&self, options: &DashboardOptions) -> Result<(), FlagsError> {
        if options.is_empty() {
            return Ok(());
        }
        info!(
            delete = options.delete.len(),
            add_if_missing = options.add_if_missing.len(),
            add_or_update = options.add_or_update.len(),
            "Applying dashboard options"
        );

        for name in &options.delete {
            match self.store.delete(name).await {
                Ok(()) | Err(StoreError::NotFound { .. }) => {},
                Err(other) => return Err(other.into()),
            }
        }

        for (name, seed) in &options.add_if_missing {
            if self.store.get_by_name(name).await?.is_none() {
                match self.store.create(seeded_flag(name, seed)).await {
                    Ok(_) | Err(StoreError::Conflict { .. }) => {},
                    Err(other) => return Err(other.into()),
                }
            }
        }

        for (name, seed) in &options.add_or_update {
            if self.store.get_by_name(name).await?.is_some() {
                self.store
                    .replace(
                        name,
                        FlagUpdate {
                            is_enabled: seed.is_enabled,
                            description: seed.description.clone(),
                            filters: seed_bindings(seed),
                        },
                    )
                    .await?;
            } else {
                match self.store.create(seeded_flag(name, seed)).await {
                    Ok(_) | Err(StoreError::Conflict { .. }) => {},
                    Err(other) => return Err(other.into()),
                }
            }
        }
        Ok(())
    }

    /// Returns every stored flag as DTOs.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn list(&self) -> Result<Vec<FeatureFlagDto>, FlagsError> {
        Ok(self.store.get_all().await?.iter().map(FeatureFlagDto::from).collect())
    }

    /// # Errors
    /// [`FlagsError::NotFound`] when the name does not exist.
    pub async fn get(&self, name: &str) -> Result<FeatureFlagDto, FlagsError> {
        self.store
            .get_by_name(name)
            .await?
            .as_ref()
            .map(FeatureFlagDto::from)
            .ok_or_else(|| FlagsError::not_found(name))
    }

    /// Creates a flag after running the validation pipeline.
    ///
    /// # Errors
    /// * [`FlagsError::ValidationRejected`] when the pipeline cancels.
    /// * [`FlagsError::Conflict`] when the name already exists.
    pub async fn create(&self, dto: FeatureFlagDto) -> Result<FeatureFlagDto, FlagsError> {
        let verdict = self.validation.can_proceed(&dto, FeatureChangeType::Create);
        if verdict.cancel {
            return Err(FlagsError::rejected(verdict.message));
        }

        let mut flag = FeatureFlag::new(&dto.name, dto.is_enabled, dto.description.clone());
        flag.filters = dto.filters.clone().unwrap_or_default();
        let created = self.store.create(flag).await?;
        info!(feature = %created.name, "Feature created");
        Ok(FeatureFlagDto::from(&created))
    }

    /// Replaces a flag wholesale after running the validation pipeline. The
    /// path name wins over any name in the body.
    ///
    /// # Errors
    /// * [`FlagsError::ValidationRejected`] when the pipeline cancels.
    /// * [`FlagsError::NotFound`] when the name does not exist.
    pub async fn update(
        &self,
        name: &str,
        mut dto: FeatureFlagDto,
    ) -> Result<FeatureFlagDto, FlagsError> {
        dto.name = name.to_owned();
        let verdict = self.validation.can_proceed(&dto, FeatureChangeType::Update);
        if verdict.cancel {
            return Err(FlagsError::rejected(verdict.message));
        }

        let updated = self
            .store
            .replace(
                name,
                FlagUpdate {
                    is_enabled: dto.is_enabled,
                    description: dto.description.clone(),
                    filters: dto.filters.unwrap_or_default(),
                },
            )
            .await?;
        info!(feature = %updated.name, "Feature updated");
        Ok(FeatureFlagDto::from(&updated))
    }

    /// Deletes a flag after running the validation pipeline (only the custom
    /// hook applies to deletes).
    ///
    /// # Errors
    /// * [`FlagsError::ValidationRejected`] when the hook cancels.
    /// * [`FlagsError::NotFound`] when the name does not exist.
    pub async fn delete(&self, name: &str) -> Result<(), FlagsError> {
        let dto = FeatureFlagDto {
            name: name.to_owned(),
            is_enabled: false,
            description: None,
            filters: None,
        };
        let verdict = self.validation.can_proceed(&dto, FeatureChangeType::Delete);
        if verdict.cancel {
            return Err(FlagsError::rejected(verdict.message));
        }

        self.store.delete(name).await?;
        info!(feature = name, "Feature deleted");
        Ok(())
    }

    /// Lists registered filter types, sorted by name for a stable API.
    #[must_use]
    pub fn filters(&self) -> Vec<FilterDto> {
        let mut filters: Vec<FilterDto> = self
            .registry
            .list_all()
            .into_iter()
            .map(|registration| FilterDto {
                name: registration.name,
                default_settings: Some(registration.default_settings_json),
            })
            .collect();
        filters.sort_by(|a, b| a.name.cmp(&b.name));
        filters
    }

    /// Total evaluation entry point used by the public flag endpoint.
    ///
    /// # Errors
    /// Only when the store itself fails.
    pub async fn is_enabled(
        &self,
        name: &str,
        targeting_key: Option<&str>,
    ) -> Result<bool, FlagsError> {
        self.evaluator.is_enabled_for(name, targeting_key).await
    }
}

fn seeded_flag(name: &str, seed: &FeatureSeed) -> FeatureFlag {
    let mut flag = FeatureFlag::new(name, seed.is_enabled, seed.description.clone());
    if let Some(binding) = &seed.filter {
        flag = flag.with_filter(binding.clone());
    }
    flag
}

fn seed_bindings(seed: &FeatureSeed) -> Vec<FilterBinding> {
    seed.filter.clone().into_iter().collect()
}
