pub trait Seal {}

impl Seal for u32 {}
impl Seal for u64 {}
impl Seal for usize {}
