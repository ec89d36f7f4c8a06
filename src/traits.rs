/// Anything that can appear in a CloudFormation template's `Resources` map.
pub trait CloudFormationResource {
    /// The CloudFormation type name, e.g. `AWS::IAM::Role`.
    fn resource_type(&self) -> &'static str;

    /// Logical IDs this resource refers to with `{"Ref": ...}`, default is none.
    fn references(&self) -> Vec<&str> {
        Vec::new()
    }
}
