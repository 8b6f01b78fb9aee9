/// Turns a module's domain value into displayable output.
///
/// Modules keep their render capability in a [`Value`](crate::value::Value)
/// so callers can swap it while the module's loop is running. Any
/// `Fn(&Input) -> Output` closure is a [`Render`].
pub trait Render<Input>: Send + Sync {
    type Output;

    fn render(&self, input: &Input) -> Self::Output;
}

impl<Input, Output, F> Render<Input> for F
where
    F: Fn(&Input) -> Output + Send + Sync,
{
    type Output = Output;

    fn render(&self, input: &Input) -> Self::Output {
        self(input)
    }
}

/// Type-erased [`Render`], as stored by modules.
pub type RenderFn<Input, Output> = dyn Render<Input, Output = Output>;
