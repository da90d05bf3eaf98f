//! Stable identifiers for conformance checks.
//!
//! IDs keep the historical test names so existing build rules that select tests by
//! name keep working.

// Suite: sepolicy (path, genfs, and property assertions)
pub const CHECK_BPFFS_TYPES: &str = "TestBpffsTypeViolations";
pub const CHECK_DATA_TYPES: &str = "TestDataTypeViolations";
pub const CHECK_PROC_TYPES: &str = "TestProcTypeViolations";
pub const CHECK_SYSFS_TYPES: &str = "TestSysfsTypeViolations";
pub const CHECK_SYSTEM_TYPES: &str = "TestSystemTypeViolations";
pub const CHECK_DEBUGFS_TYPES: &str = "TestDebugfsTypeViolations";
pub const CHECK_TRACEFS_TYPES: &str = "TestTracefsTypeViolations";
pub const CHECK_VENDOR_TYPES: &str = "TestVendorTypeViolations";
pub const CHECK_CORE_DATA_TYPES: &str = "TestCoreDataTypeViolations";
pub const CHECK_PROPERTY_TYPES: &str = "TestPropertyTypeViolations";
pub const CHECK_APP_DATA_TYPES: &str = "TestAppDataTypeViolations";
pub const CHECK_DMA_HEAP_DEV_TYPES: &str = "TestDmaHeapDevTypeViolations";
pub const CHECK_DEV_TYPES: &str = "TestDevTypeViolations";

// Shared by both suites
pub const CHECK_COREDOMAIN: &str = "TestCoredomainViolations";
pub const CHECK_ISOLATED_ATTRIBUTE_CONSISTENCY: &str = "TestIsolatedAttributeConsistency";

// Suite: treble
pub const CHECK_VENDOR_DATA_NOT_CORE: &str = "TestVendorDataNotCoreDataType";
pub const CHECK_VIOLATOR_ATTRIBUTES: &str = "TestViolatorAttributes";
pub const CHECK_NO_UNMAPPED_NEW_TYPES: &str = "TestNoUnmappedNewTypes";
pub const CHECK_NO_UNMAPPED_RM_TYPES: &str = "TestNoUnmappedRmTypes";

// Standalone tools
pub const CHECK_APEX_FILE_CONTEXTS: &str = "apex.file_contexts";
pub const CHECK_PUBLIC_FREEZE: &str = "compat.public_freeze";
pub const CHECK_PROPERTY_PREFIX: &str = "property_contexts.prefix";
