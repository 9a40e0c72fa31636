pub fn confirm<T>(prompt: T) -> dialoguer::Result<bool>
where
    T: Into<String>,
{
    dialoguer::Confirm::new().with_prompt(prompt).interact()
}
