//! Root signature: the binding contract between shaders and the pipeline.
//!
//! No resources are bound, so the description carries zero root parameters
//! and zero static samplers; only its access flags vary.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use super::error::{capture_device_error, PipelineSetupError};

bitflags! {
    /// Which stages may read root-level bindings, and whether the input
    /// assembler may consume an input layout.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct RootSignatureFlags: u32 {
        const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 0x1;
        const DENY_VERTEX_SHADER_ROOT_ACCESS = 0x2;
        const DENY_HULL_SHADER_ROOT_ACCESS = 0x4;
        const DENY_DOMAIN_SHADER_ROOT_ACCESS = 0x8;
        const DENY_GEOMETRY_SHADER_ROOT_ACCESS = 0x10;
        const DENY_PIXEL_SHADER_ROOT_ACCESS = 0x20;
    }
}

impl RootSignatureFlags {
    /// Stages still allowed to read root bindings.
    pub fn visible_stages(self) -> wgpu::ShaderStages {
        let mut stages = wgpu::ShaderStages::NONE;
        if !self.contains(Self::DENY_VERTEX_SHADER_ROOT_ACCESS) {
            stages |= wgpu::ShaderStages::VERTEX;
        }
        if !self.contains(Self::DENY_PIXEL_SHADER_ROOT_ACCESS) {
            stages |= wgpu::ShaderStages::FRAGMENT;
        }
        stages
    }

    pub fn allows_input_layout(self) -> bool {
        self.contains(Self::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum RootSignatureVersion {
    V1_0,
    V1_1,
}

impl RootSignatureVersion {
    fn code(self) -> u32 {
        match self {
            RootSignatureVersion::V1_0 => 0x1,
            RootSignatureVersion::V1_1 => 0x2,
        }
    }

    fn from_code(code: u32) -> Option<Self> {
        match code {
            0x1 => Some(RootSignatureVersion::V1_0),
            0x2 => Some(RootSignatureVersion::V1_1),
            _ => None,
        }
    }
}

/// Versioned root signature description.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RootSignatureDesc {
    pub version: RootSignatureVersion,
    pub flags: RootSignatureFlags,
}

const MAGIC: [u8; 4] = *b"RTSG";

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BlobHeader {
    magic: [u8; 4],
    version: u32,
    flags: u32,
    num_parameters: u32,
    num_static_samplers: u32,
}

/// Serialized root signature, the form the device consumes.
///
/// Two root signatures are compatible exactly when their blobs match.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SerializedRootSignature(Vec<u8>);

impl SerializedRootSignature {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes the blob back into a description.
    pub fn deserialize(&self) -> Result<RootSignatureDesc, PipelineSetupError> {
        let reject = |msg: &str| PipelineSetupError::RootSignatureFailed(msg.to_string());

        if self.0.len() != std::mem::size_of::<BlobHeader>() {
            return Err(reject("serialized root signature has the wrong size"));
        }
        let header: BlobHeader = bytemuck::try_pod_read_unaligned(&self.0)
            .map_err(|_| reject("serialized root signature is unreadable"))?;

        if header.magic != MAGIC {
            return Err(reject("serialized root signature has a bad magic"));
        }
        let version = RootSignatureVersion::from_code(u32::from_le(header.version))
            .ok_or_else(|| reject("unsupported root signature version"))?;
        let flags = RootSignatureFlags::from_bits(u32::from_le(header.flags))
            .ok_or_else(|| reject("root signature carries unknown flags"))?;
        if header.num_parameters != 0 || header.num_static_samplers != 0 {
            return Err(reject("root parameters and static samplers are not supported"));
        }

        Ok(RootSignatureDesc { version, flags })
    }
}

/// Device-level root signature object.
#[derive(Debug)]
pub struct RootSignature {
    layout: wgpu::PipelineLayout,
    desc: RootSignatureDesc,
    blob: SerializedRootSignature,
}

impl RootSignature {
    pub fn flags(&self) -> RootSignatureFlags {
        self.desc.flags
    }

    pub fn blob(&self) -> &SerializedRootSignature {
        &self.blob
    }

    pub(crate) fn layout(&self) -> &wgpu::PipelineLayout {
        &self.layout
    }
}

/// Builds a [`RootSignature`] with no bound resources.
#[derive(Debug, Copy, Clone)]
pub struct RootSignatureBuilder {
    desc: RootSignatureDesc,
    target: RootSignatureVersion,
}

impl RootSignatureBuilder {
    /// Describes a 1.1 root signature serialized as 1.0.
    pub fn new(flags: RootSignatureFlags) -> Self {
        Self {
            desc: RootSignatureDesc {
                version: RootSignatureVersion::V1_1,
                flags,
            },
            target: RootSignatureVersion::V1_0,
        }
    }

    pub fn serialize_as(mut self, target: RootSignatureVersion) -> Self {
        self.target = target;
        self
    }

    pub fn desc(&self) -> RootSignatureDesc {
        self.desc
    }

    /// Serializes the description at the target version.
    ///
    /// With no parameters, a 1.1 description downgrades to 1.0 losslessly.
    pub fn serialize(&self) -> Result<SerializedRootSignature, PipelineSetupError> {
        if self.desc.flags.bits() & !RootSignatureFlags::all().bits() != 0 {
            return Err(PipelineSetupError::RootSignatureFailed(format!(
                "unknown root signature flags 0x{:x}",
                self.desc.flags.bits()
            )));
        }

        let header = BlobHeader {
            magic: MAGIC,
            version: self.target.code().to_le(),
            flags: self.desc.flags.bits().to_le(),
            num_parameters: 0,
            num_static_samplers: 0,
        };
        Ok(SerializedRootSignature(bytemuck::bytes_of(&header).to_vec()))
    }

    /// Serializes the description and creates the device object from the blob.
    pub fn build(&self, device: &wgpu::Device) -> Result<RootSignature, PipelineSetupError> {
        let blob = self.serialize()?;
        create_root_signature(device, blob)
    }
}

/// Creates a device root signature from a serialized blob.
pub fn create_root_signature(
    device: &wgpu::Device,
    blob: SerializedRootSignature,
) -> Result<RootSignature, PipelineSetupError> {
    let desc = blob.deserialize()?;

    let (layout, err) = capture_device_error(device, || {
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trigon root signature"),
            bind_group_layouts: &[],
            immediate_size: 0,
        })
    });
    if let Some(err) = err {
        return Err(PipelineSetupError::RootSignatureFailed(err.to_string()));
    }

    log::info!(
        "root signature created ({:?}, flags {:?}, root-visible stages {:?})",
        desc.version,
        desc.flags,
        desc.flags.visible_stages()
    );

    Ok(RootSignature { layout, desc, blob })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_flags() -> RootSignatureFlags {
        RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT
            | RootSignatureFlags::DENY_HULL_SHADER_ROOT_ACCESS
            | RootSignatureFlags::DENY_DOMAIN_SHADER_ROOT_ACCESS
            | RootSignatureFlags::DENY_GEOMETRY_SHADER_ROOT_ACCESS
    }

    #[test]
    fn serialize_downgrades_to_the_target_version() {
        let builder = RootSignatureBuilder::new(sample_flags());
        assert_eq!(builder.desc().version, RootSignatureVersion::V1_1);

        let decoded = builder.serialize().unwrap().deserialize().unwrap();
        assert_eq!(decoded.version, RootSignatureVersion::V1_0);
        assert_eq!(decoded.flags, sample_flags());
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = RootSignatureBuilder::new(sample_flags()).serialize().unwrap();
        let b = RootSignatureBuilder::new(sample_flags()).serialize().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes().len(), 20);
        assert_eq!(&a.as_bytes()[..4], b"RTSG");
    }

    #[test]
    fn different_flags_are_incompatible() {
        let a = RootSignatureBuilder::new(sample_flags()).serialize().unwrap();
        let b = RootSignatureBuilder::new(RootSignatureFlags::empty()).serialize().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_flag_bits_fail_serialization() {
        let flags = RootSignatureFlags::from_bits_retain(0x8000);
        let err = RootSignatureBuilder::new(flags).serialize().unwrap_err();
        assert!(matches!(err, PipelineSetupError::RootSignatureFailed(_)));
    }

    #[test]
    fn corrupt_blobs_are_rejected() {
        let good = RootSignatureBuilder::new(sample_flags()).serialize().unwrap();

        let mut bad_magic = good.as_bytes().to_vec();
        bad_magic[0] = b'X';
        assert!(SerializedRootSignature::from_bytes(bad_magic).deserialize().is_err());

        let truncated = good.as_bytes()[..12].to_vec();
        assert!(SerializedRootSignature::from_bytes(truncated).deserialize().is_err());

        let mut bad_version = good.as_bytes().to_vec();
        bad_version[4] = 0x7;
        assert!(SerializedRootSignature::from_bytes(bad_version).deserialize().is_err());
    }

    #[test]
    fn visible_stages_follow_deny_flags() {
        assert_eq!(
            sample_flags().visible_stages(),
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT
        );
        let denied = RootSignatureFlags::DENY_PIXEL_SHADER_ROOT_ACCESS;
        assert_eq!(denied.visible_stages(), wgpu::ShaderStages::VERTEX);
        assert!(!denied.allows_input_layout());
    }
}
