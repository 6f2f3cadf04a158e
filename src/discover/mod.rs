//! Resource discovery against the tenancy.
//!
//! Fills in whatever the launch settings leave unset: availability
//! domains, the subnet (first subnet of the first VCN) and the boot image
//! (newest non-minimal Ubuntu aarch64 build for the shape). A field set
//! explicitly in configuration is never second-guessed.

use crate::config::LaunchSettings;
use crate::domain::{LaunchSpec, ShapeProfile};
use crate::error::{ArmgrabError, Result};
use crate::oci::ComputeApi;
use crate::oci::models::Image;

/// Resolve settings plus discovery into a validated [`LaunchSpec`].
pub async fn resolve_spec(
    api: &impl ComputeApi,
    tenancy_id: &str,
    settings: &LaunchSettings,
) -> Result<LaunchSpec> {
    let compartment_id = settings.compartment_id.clone().unwrap_or_else(|| tenancy_id.to_string());

    let availability_domains = if settings.availability_domains.is_empty() {
        resolve_availability_domains(api, &compartment_id).await?
    } else {
        settings.availability_domains.clone()
    };

    let subnet_id = match &settings.subnet_id {
        Some(id) => id.clone(),
        None => resolve_subnet(api, &compartment_id).await?,
    };

    let image_id = match &settings.image_id {
        Some(id) => id.clone(),
        None => resolve_image(api, &compartment_id, &settings.shape).await?,
    };

    let spec = LaunchSpec {
        compartment_id,
        availability_domains,
        shape: settings.shape.clone(),
        shape_profile: ShapeProfile {
            ocpus: settings.ocpus,
            memory_in_gbs: settings.memory_in_gbs,
        },
        image_id,
        subnet_id,
        display_name: settings.display_name.clone(),
        ssh_public_key: settings.read_ssh_public_key()?,
    };

    spec.validate()?;
    Ok(spec)
}

/// All availability domains in the compartment, in API order.
pub async fn resolve_availability_domains(api: &impl ComputeApi, compartment_id: &str) -> Result<Vec<String>> {
    let ads = api.list_availability_domains(compartment_id).await?;
    if ads.is_empty() {
        return Err(ArmgrabError::Discovery(
            "no availability domains visible in compartment".to_string(),
        ));
    }
    let names: Vec<String> = ads.into_iter().map(|ad| ad.name).collect();
    log::info!("Discovered availability domains: {}", names.join(", "));
    Ok(names)
}

/// First subnet of the first VCN, the way the free-tier console sets
/// tenancies up.
pub async fn resolve_subnet(api: &impl ComputeApi, compartment_id: &str) -> Result<String> {
    let vcns = api.list_vcns(compartment_id).await?;
    let vcn = vcns
        .first()
        .ok_or_else(|| ArmgrabError::Discovery("no VCN in compartment; create one first".to_string()))?;

    let subnets = api.list_subnets(compartment_id, &vcn.id).await?;
    let subnet = subnets
        .first()
        .ok_or_else(|| ArmgrabError::Discovery(format!("VCN {} has no subnets", vcn.id)))?;

    log::info!("Discovered subnet {} in VCN {}", subnet.id, vcn.id);
    Ok(subnet.id.clone())
}

/// Newest Ubuntu aarch64 image compatible with the shape.
pub async fn resolve_image(api: &impl ComputeApi, compartment_id: &str, shape: &str) -> Result<String> {
    let images = api.list_images(compartment_id, shape).await?;
    let image = pick_ubuntu_arm_image(&images).ok_or_else(|| {
        ArmgrabError::Discovery(format!("no Ubuntu aarch64 image available for shape {}", shape))
    })?;

    log::info!("Discovered image {} ({})", image.display_name, image.id);
    Ok(image.id.clone())
}

/// Newest image whose display name says Ubuntu + aarch64, skipping
/// Minimal builds.
pub fn pick_ubuntu_arm_image(images: &[Image]) -> Option<&Image> {
    images
        .iter()
        .filter(|img| {
            img.display_name.contains("Ubuntu")
                && img.display_name.contains("aarch64")
                && !img.display_name.contains("Minimal")
        })
        .max_by_key(|img| img.time_created)
}
