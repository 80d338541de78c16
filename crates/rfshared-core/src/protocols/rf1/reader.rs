use super::error::DecodeError;
use super::layout::{Field, FieldType, StructKind};
use super::model::FixedText;

/// Bounded, forward-only access to a raw snapshot buffer.
pub struct ByteReader<'a> {
    payload: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, pos: 0 }
    }

    pub fn require_len(&self, expected: usize) -> Result<(), DecodeError> {
        if self.payload.len() != expected {
            return Err(DecodeError::SizeMismatch {
                expected,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(len).ok_or(DecodeError::SizeMismatch {
            expected: usize::MAX,
            actual: self.payload.len(),
        })?;
        let bytes = self
            .payload
            .get(self.pos..end)
            .ok_or(DecodeError::SizeMismatch {
                expected: end,
                actual: self.payload.len(),
            })?;
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }
}

/// Walks one structure's catalog entries in declared order.
///
/// Every read names the field it expects; the request is checked against the
/// next catalog entry so the decoder cannot drift from the layout.
pub struct FieldCursor<'r, 'a> {
    bytes: &'r mut ByteReader<'a>,
    kind: StructKind,
    fields: std::slice::Iter<'static, Field>,
    start: usize,
}

impl<'r, 'a> FieldCursor<'r, 'a> {
    pub fn new(bytes: &'r mut ByteReader<'a>, kind: StructKind) -> Self {
        let start = bytes.position();
        Self {
            bytes,
            kind,
            fields: kind.fields().iter(),
            start,
        }
    }

    /// Postcondition: every field consumed and exactly `kind.size()` bytes read.
    pub fn finish(mut self) {
        debug_assert!(
            self.fields.next().is_none(),
            "{} has unread catalog fields",
            self.kind.name()
        );
        debug_assert_eq!(
            self.bytes.position() - self.start,
            self.kind.size(),
            "{} consumed a different width than cataloged",
            self.kind.name()
        );
    }

    fn check_next(&mut self, name: &str, ty: FieldType, count: usize) {
        let field = self.fields.next();
        debug_assert_eq!(
            field.map(|f| (f.name, f.ty, f.count)),
            Some((name, ty, count)),
            "{} read out of catalog order",
            self.kind.name()
        );
    }

    pub fn i8(&mut self, name: &str) -> Result<i8, DecodeError> {
        self.check_next(name, FieldType::I8, 1);
        Ok(i8::from_le_bytes(self.bytes.read_array()?))
    }

    pub fn u8(&mut self, name: &str) -> Result<u8, DecodeError> {
        self.check_next(name, FieldType::U8, 1);
        Ok(u8::from_le_bytes(self.bytes.read_array()?))
    }

    pub fn bool(&mut self, name: &str) -> Result<bool, DecodeError> {
        self.check_next(name, FieldType::Bool, 1);
        let [byte]: [u8; 1] = self.bytes.read_array()?;
        Ok(byte != 0)
    }

    pub fn i16(&mut self, name: &str) -> Result<i16, DecodeError> {
        self.check_next(name, FieldType::I16, 1);
        Ok(i16::from_le_bytes(self.bytes.read_array()?))
    }

    pub fn i32(&mut self, name: &str) -> Result<i32, DecodeError> {
        self.check_next(name, FieldType::I32, 1);
        Ok(i32::from_le_bytes(self.bytes.read_array()?))
    }

    pub fn f32(&mut self, name: &str) -> Result<f32, DecodeError> {
        self.check_next(name, FieldType::F32, 1);
        Ok(f32::from_le_bytes(self.bytes.read_array()?))
    }

    pub fn text<const N: usize>(&mut self, name: &str) -> Result<FixedText<N>, DecodeError> {
        self.check_next(name, FieldType::Text(N), 1);
        Ok(FixedText::new(self.bytes.read_array()?))
    }

    pub fn i8_array<const N: usize>(&mut self, name: &str) -> Result<[i8; N], DecodeError> {
        self.check_next(name, FieldType::I8, N);
        let raw: [u8; N] = self.bytes.read_array()?;
        Ok(raw.map(|b| i8::from_le_bytes([b])))
    }

    pub fn f32_array<const N: usize>(&mut self, name: &str) -> Result<[f32; N], DecodeError> {
        self.check_next(name, FieldType::F32, N);
        let mut out = [0f32; N];
        for value in out.iter_mut() {
            *value = f32::from_le_bytes(self.bytes.read_array()?);
        }
        Ok(out)
    }

    /// Decode one nested structure with its own catalog cursor.
    pub fn nested<T, F>(&mut self, name: &str, kind: StructKind, decode: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut FieldCursor<'_, 'a>) -> Result<T, DecodeError>,
    {
        self.check_next(name, FieldType::Struct(kind), 1);
        self.element(kind, decode)
    }

    /// Decode a fixed array of nested structures, element by element in index order.
    pub fn nested_array<T, F, const N: usize>(
        &mut self,
        name: &str,
        kind: StructKind,
        mut decode: F,
    ) -> Result<[T; N], DecodeError>
    where
        T: Default,
        F: FnMut(&mut FieldCursor<'_, 'a>) -> Result<T, DecodeError>,
    {
        self.check_next(name, FieldType::Struct(kind), N);
        let mut out: [T; N] = std::array::from_fn(|_| T::default());
        for slot in out.iter_mut() {
            *slot = self.element(kind, &mut decode)?;
        }
        Ok(out)
    }

    fn element<T, F>(&mut self, kind: StructKind, decode: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut FieldCursor<'_, 'a>) -> Result<T, DecodeError>,
    {
        let mut inner = FieldCursor::new(&mut *self.bytes, kind);
        let value = decode(&mut inner)?;
        inner.finish();
        Ok(value)
    }
}
