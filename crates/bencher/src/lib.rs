#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    request: TestRequest,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, request: TestRequest) -> Self {
        Self { name, group, request }
    }

    pub fn small(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Small, request)
    }

    pub fn normal(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Normal, request)
    }

    pub fn large(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Large, request)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn request(&self) -> &TestRequest {
        &self.request
    }

    /// Paths registered in the route table for this case, `/route/0` up to the group size.
    pub fn route_paths(&self) -> impl Iterator<Item = String> {
        (0..self.group.route_count()).map(|i| format!("/route/{i}"))
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestRequest {
    method: &'static str,
    uri: &'static str,
}

impl TestRequest {
    pub const fn new(method: &'static str, uri: &'static str) -> Self {
        Self { method, uri }
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn uri(&self) -> &'static str {
        self.uri
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

impl TestGroup {
    pub fn route_count(self) -> usize {
        match self {
            TestGroup::Small => 8,
            TestGroup::Normal => 128,
            TestGroup::Large => 4096,
        }
    }
}
