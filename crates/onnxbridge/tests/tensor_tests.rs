use onnxbridge::{BridgeError, HostData, TensorInput, TensorRegistry, TensorType};

#[test]
fn test_create_and_read_back_float32() {
    let registry = TensorRegistry::new();

    let info = registry
        .create_tensor(
            TensorType::Float32,
            TensorInput::Floats(vec![1.0, 2.0, 3.0, 4.0]),
            vec![2, 2],
        )
        .unwrap();
    assert!(info.tensor_id.starts_with("tensor_"));
    assert_eq!(info.dtype, TensorType::Float32);
    assert_eq!(info.shape, vec![2, 2]);

    let host = registry.get_tensor_data(&info.tensor_id).unwrap();
    assert_eq!(host.data, HostData::Floats(vec![1.0, 2.0, 3.0, 4.0]));
    assert_eq!(host.shape, vec![2, 2]);
    assert_eq!(host.dtype, TensorType::Float32);

    assert_eq!(
        registry.get_tensor_type(&info.tensor_id).unwrap(),
        TensorType::Float32
    );
    assert_eq!(
        registry.get_tensor_shape(&info.tensor_id).unwrap(),
        vec![2, 2]
    );
}

#[test]
fn test_create_from_packed_bytes() {
    let registry = TensorRegistry::new();

    let mut bytes = Vec::new();
    for x in [1.5f32, -2.5, 0.0] {
        bytes.extend_from_slice(&x.to_ne_bytes());
    }
    let info = registry
        .create_tensor(TensorType::Float32, TensorInput::Bytes(bytes), vec![3])
        .unwrap();

    let host = registry.get_tensor_data(&info.tensor_id).unwrap();
    assert_eq!(host.data, HostData::Floats(vec![1.5, -2.5, 0.0]));
}

#[test]
fn test_create_rejects_ragged_bytes() {
    let registry = TensorRegistry::new();

    let err = registry
        .create_tensor(TensorType::Int64, TensorInput::Bytes(vec![0; 12]), vec![2])
        .unwrap_err();
    assert!(matches!(err, BridgeError::Argument(_)));
    assert_eq!(err.code(), "INVALID_ARG");
}

#[test]
fn test_create_rejects_bad_shapes() {
    let registry = TensorRegistry::new();

    // element count disagrees with the shape product
    let err = registry
        .create_tensor(
            TensorType::Float32,
            TensorInput::Floats(vec![1.0, 2.0, 3.0, 4.0]),
            vec![3],
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::ShapeMismatch(_)));
    assert_eq!(err.code(), "SHAPE_MISMATCH");

    // empty shape
    let err = registry
        .create_tensor(TensorType::Float32, TensorInput::Floats(vec![1.0]), vec![])
        .unwrap_err();
    assert!(matches!(err, BridgeError::ShapeMismatch(_)));

    // negative dimension
    let err = registry
        .create_tensor(
            TensorType::Float32,
            TensorInput::Floats(vec![1.0, 2.0]),
            vec![-1, 2],
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::ShapeMismatch(_)));

    // nothing was registered along the way
    assert!(registry.ids().is_empty());
}

#[test]
fn test_create_coerces_generic_sequences() {
    let registry = TensorRegistry::new();

    // doubles narrowing to int32 round half away from zero
    let info = registry
        .create_tensor(
            TensorType::Int32,
            TensorInput::Floats(vec![3.7, -3.5, 0.2]),
            vec![3],
        )
        .unwrap();
    let host = registry.get_tensor_data(&info.tensor_id).unwrap();
    assert_eq!(host.data, HostData::Ints(vec![4, -4, 0]));

    // ints widening to float32
    let info = registry
        .create_tensor(TensorType::Float32, TensorInput::Ints(vec![1, -2]), vec![2])
        .unwrap();
    let host = registry.get_tensor_data(&info.tensor_id).unwrap();
    assert_eq!(host.data, HostData::Floats(vec![1.0, -2.0]));

    // doubles clamping into uint8
    let info = registry
        .create_tensor(
            TensorType::Uint8,
            TensorInput::Floats(vec![-5.0, 300.0]),
            vec![2],
        )
        .unwrap();
    let host = registry.get_tensor_data(&info.tensor_id).unwrap();
    assert_eq!(host.data, HostData::Ints(vec![0, 255]));

    // numeric input into a bool tensor is value != 0
    let info = registry
        .create_tensor(
            TensorType::Bool,
            TensorInput::Ints(vec![0, 3, -1]),
            vec![3],
        )
        .unwrap();
    let host = registry.get_tensor_data(&info.tensor_id).unwrap();
    assert_eq!(host.data, HostData::Ints(vec![0, 1, 1]));
}

#[test]
fn test_bool_data_requires_bool_dtype() {
    let registry = TensorRegistry::new();

    let err = registry
        .create_tensor(
            TensorType::Int32,
            TensorInput::Bools(vec![true, false]),
            vec![2],
        )
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ARG");

    let info = registry
        .create_tensor(
            TensorType::Bool,
            TensorInput::Bools(vec![true, false]),
            vec![2],
        )
        .unwrap();
    assert_eq!(info.dtype, TensorType::Bool);
}

#[test]
fn test_release_is_idempotent() {
    let registry = TensorRegistry::new();

    let info = registry
        .create_tensor(TensorType::Int64, TensorInput::Ints(vec![1, 2]), vec![2])
        .unwrap();

    assert!(registry.release_tensor(&info.tensor_id));
    assert!(!registry.release_tensor(&info.tensor_id));
    assert!(!registry.release_tensor("tensor_99999"));
}

#[test]
fn test_lookup_after_release_fails() {
    let registry = TensorRegistry::new();

    let info = registry
        .create_tensor(TensorType::Int64, TensorInput::Ints(vec![5]), vec![1])
        .unwrap();
    assert!(registry.release_tensor(&info.tensor_id));

    let err = registry.get_tensor_data(&info.tensor_id).unwrap_err();
    assert!(matches!(err, BridgeError::TensorNotFound(_)));
    assert_eq!(err.code(), "NOT_FOUND");
    assert_eq!(
        err.to_string(),
        format!("tensor not found: {}", info.tensor_id)
    );
}

#[test]
fn test_concurrent_creates_get_distinct_ids() {
    let registry = TensorRegistry::new();
    let threads: usize = 8;
    let per_thread: usize = 16;

    let ids = std::sync::Mutex::new(Vec::new());
    std::thread::scope(|scope| {
        let registry = &registry;
        let ids = &ids;
        for t in 0..threads {
            scope.spawn(move || {
                let mut local = Vec::new();
                for _ in 0..per_thread {
                    let info = registry
                        .create_tensor(
                            TensorType::Int32,
                            TensorInput::Ints(vec![t as i64]),
                            vec![1],
                        )
                        .unwrap();
                    local.push(info.tensor_id);
                }
                ids.lock().unwrap().extend(local);
            });
        }
    });

    let ids = ids.into_inner().unwrap();
    assert_eq!(ids.len(), threads * per_thread);

    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "ids must be distinct");

    for id in &ids {
        assert!(registry.get_tensor_shape(id).is_ok());
    }
}
